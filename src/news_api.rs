use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use lazy_static::lazy_static;
use log::*;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config_manager::NewsConfig;

const NAVER_NEWS_URL: &str = "https://openapi.naver.com/v1/search/news.json";

lazy_static! {
    static ref HTML_TAG: Regex = Regex::new(r"<.*?>").unwrap();
}

/// `<b>재개발</b>` 같은 태그를 지운다.
pub fn strip_html_tags(text: &str) -> String {
    HTML_TAG.replace_all(text, "").into_owned()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "pubDate")]
    pub pub_date: String,
}

#[derive(Debug, Deserialize)]
struct NaverNewsResponse {
    #[serde(default)]
    items: Vec<NewsItem>,
}

/// 검색어로 뉴스를 찾아 주는 외부 서비스
#[async_trait]
pub trait NewsSource {
    async fn search(&self, query: &str) -> Result<Vec<NewsItem>>;
}

pub struct NaverNewsApi {
    client: Client,
    client_id: String,
    client_secret: String,
    display: u32,
}

impl NaverNewsApi {
    pub fn new(config: &NewsConfig) -> Result<Self> {
        if config.client_id.trim().is_empty() || config.client_secret.trim().is_empty() {
            return Err(anyhow!("네이버 검색 API의 client_id/client_secret이 설정되지 않았습니다."));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            client_id: config.client_id.trim().to_string(),
            client_secret: config.client_secret.trim().to_string(),
            display: config.display,
        })
    }

    fn request_url(&self, query: &str) -> String {
        format!(
            "{}?query={}&display={}",
            NAVER_NEWS_URL,
            urlencoding::encode(query),
            self.display
        )
    }
}

#[async_trait]
impl NewsSource for NaverNewsApi {
    async fn search(&self, query: &str) -> Result<Vec<NewsItem>> {
        let url = self.request_url(query);
        debug!("뉴스 검색 요청: {}", url);

        let response = self.client
            .get(&url)
            .header("X-Naver-Client-Id", &self.client_id)
            .header("X-Naver-Client-Secret", &self.client_secret)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("네이버 뉴스 API HTTP 오류: {} - 검색어: {}", response.status(), query));
        }

        let body: NaverNewsResponse = response.json().await?;
        info!("'{}' 뉴스 {}건 조회", query, body.items.len());
        Ok(body.items)
    }
}
