use std::path::Path;

use anyhow::Result;
use log::*;

pub mod config_manager;
use config_manager::ConfigManager;
pub mod house_type;
pub mod transaction_data_manager;
use transaction_data_manager::TransactionDataManager;
pub mod view_model;

pub mod price_analyzer;
pub mod redevelopment_analyzer;

pub mod news_api;
use news_api::NaverNewsApi;
pub mod news_collector;
use news_collector::NewsCollector;

pub mod dashboard;
use dashboard::{ExplorerInputs, ReportSettings};

pub use house_type::HouseType;

const CONFIG_FILE: &str = "config.ini";

/// 두 페이지를 기본 입력값으로 계산해 JSON으로 출력한다.
/// 뉴스 API 키가 설정되어 있으면 뉴스도 가져온다.
pub async fn run() -> Result<()> {
    // 1. ConfigManager 초기화
    let config_manager = ConfigManager::new(Path::new(CONFIG_FILE))?;

    // 2. TransactionDataManager 초기화
    let data_dir = config_manager.get_data_dir();
    info!("데이터 디렉토리: {}", data_dir.display());
    let data_manager = TransactionDataManager::new(data_dir);

    // 3. 평당 가격 페이지
    let explorer = dashboard::render_price_explorer(&data_manager, &ExplorerInputs::default())?;
    println!("{}", serde_json::to_string_pretty(&explorer)?);

    // 4. 재개발 부지 선정 페이지
    let settings = ReportSettings::from_config(&config_manager);
    let report = dashboard::render_redevelopment_report(&data_manager, &settings)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    // 5. 뉴스 (API 키가 있을 때만)
    if config_manager.has_news_credentials() {
        let news_api = NaverNewsApi::new(&config_manager.config.news)?;
        let sections = NewsCollector::default()
            .collect(&news_api, |progress| {
                if let Some(p) = progress.progress {
                    info!("[{}] {} ({:.0})", progress.step, progress.message, p);
                }
            })
            .await?;
        println!("{}", serde_json::to_string_pretty(&sections)?);
    } else {
        info!("뉴스 API 키가 없어 뉴스 조회를 건너뜁니다.");
    }

    Ok(())
}
