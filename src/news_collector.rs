use std::time::Duration;

use anyhow::Result;
use log::*;

use crate::news_api::{strip_html_tags, NewsSource};
use crate::view_model::{LoadingProgress, NewsLink, NewsSection};

/// 재개발 부지로 선정된 지역의 뉴스 검색어
pub const REDEVELOPMENT_QUERIES: [&str; 5] = [
    "관악구 신림동 재개발",
    "강북구 수유동 재개발",
    "관악구 봉천동 재개발",
    "양천구 신월동 재개발",
    "강북구 미아동 재개발",
];

const PROGRESS_STEP: &str = "news_fetch";

pub struct NewsCollector {
    queries: Vec<String>,
    pause: Duration,
}

impl Default for NewsCollector {
    fn default() -> Self {
        Self::new(REDEVELOPMENT_QUERIES.iter().map(|q| q.to_string()).collect())
    }
}

impl NewsCollector {
    pub fn new(queries: Vec<String>) -> Self {
        Self {
            queries,
            pause: Duration::from_millis(50),
        }
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    /// 검색어를 하나씩 순서대로 조회한다. 검색어마다 진행률을 알리고,
    /// 결과가 없는 검색어는 섹션을 만들지 않는다. 조회 실패는 그대로 전파된다.
    pub async fn collect<S, F>(&self, source: &S, mut on_progress: F) -> Result<Vec<NewsSection>>
    where
        S: NewsSource + Sync + ?Sized,
        F: FnMut(LoadingProgress),
    {
        let total_queries = self.queries.len();
        let mut sections = Vec::new();

        for (i, query) in self.queries.iter().enumerate() {
            let news = source.search(query).await?;
            if !news.is_empty() {
                let links = news
                    .into_iter()
                    .map(|item| NewsLink {
                        title: strip_html_tags(&item.title),
                        link: item.link,
                    })
                    .collect();
                sections.push(NewsSection {
                    query: query.clone(),
                    heading: format!("{} 관련 뉴스", query),
                    links,
                });
            } else {
                debug!("'{}' 검색 결과 없음", query);
            }

            let progress = (i + 1) * 100 / total_queries;
            on_progress(LoadingProgress {
                step: PROGRESS_STEP.to_string(),
                message: format!("{}% Complete", progress),
                progress: Some(progress as f64),
                completed: false,
            });

            tokio::time::sleep(self.pause).await;
        }

        // 진행 표시 지우기
        on_progress(LoadingProgress {
            step: PROGRESS_STEP.to_string(),
            message: String::new(),
            progress: None,
            completed: true,
        });

        info!("재개발 관련 뉴스 {}개 검색어 중 {}개에서 결과를 찾았습니다.", total_queries, sections.len());
        Ok(sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news_api::NewsItem;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubSource {
        calls: Mutex<Vec<String>>,
    }

    impl StubSource {
        fn new() -> Self {
            Self { calls: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl NewsSource for StubSource {
        async fn search(&self, query: &str) -> Result<Vec<NewsItem>> {
            self.calls.lock().unwrap().push(query.to_string());
            if query.contains("수유동") {
                return Ok(vec![]);
            }
            Ok(vec![NewsItem {
                title: format!("<b>{}</b> 소식", query),
                link: format!("https://news.example/{}", self.calls.lock().unwrap().len()),
                description: String::new(),
                pub_date: String::new(),
            }])
        }
    }

    struct FailingSource;

    #[async_trait]
    impl NewsSource for FailingSource {
        async fn search(&self, query: &str) -> Result<Vec<NewsItem>> {
            if query.contains("봉천동") {
                Err(anyhow!("503"))
            } else {
                Ok(vec![])
            }
        }
    }

    #[tokio::test]
    async fn reports_progress_after_every_query() {
        let source = StubSource::new();
        let collector = NewsCollector::default().with_pause(Duration::ZERO);
        let mut events = Vec::new();

        let sections = collector.collect(&source, |p| events.push(p)).await.unwrap();

        let progress: Vec<Option<f64>> = events.iter().map(|e| e.progress).collect();
        assert_eq!(
            progress,
            vec![Some(20.0), Some(40.0), Some(60.0), Some(80.0), Some(100.0), None]
        );
        assert_eq!(events[0].message, "20% Complete");
        assert!(events.last().unwrap().completed);
        assert_eq!(source.calls.lock().unwrap().len(), 5);

        // 결과가 없는 수유동은 섹션이 없다
        assert_eq!(sections.len(), 4);
        assert!(sections.iter().all(|s| !s.query.contains("수유동")));
        assert_eq!(sections[0].heading, "관악구 신림동 재개발 관련 뉴스");
        assert_eq!(sections[0].links[0].title, "관악구 신림동 재개발 소식");
        assert_eq!(
            sections[0].links[0].to_markdown(),
            "[관악구 신림동 재개발 소식](https://news.example/1)"
        );
    }

    #[tokio::test]
    async fn failure_stops_the_loop() {
        let collector = NewsCollector::default().with_pause(Duration::ZERO);
        let mut events = Vec::new();

        let result = collector.collect(&FailingSource, |p| events.push(p)).await;

        assert!(result.is_err());
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| !e.completed));
    }
}
