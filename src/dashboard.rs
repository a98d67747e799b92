use std::path::PathBuf;

use anyhow::{Result, anyhow};
use chrono::{Datelike, Local};
use log::*;
use serde::{Deserialize, Serialize};

use crate::config_manager::ConfigManager;
use crate::house_type::HouseType;
use crate::price_analyzer::{column_map, district_options, price_bar_chart, sub_district_options};
use crate::redevelopment_analyzer::{
    rank_old_buildings, rank_old_transactions, ranking_chart, relabel_excluded_frame, DistrictCount,
};
use crate::transaction_data_manager::{
    filter_eq, frame_to_table, records_from_frame, TransactionDataManager, BJDONG_NM,
};
use crate::view_model::{BarChart, EmbedView, ImageView, MapView, TableView};

// 화곡동 관련 기사
const RELATED_ARTICLE_URL: &str = "https://v.daum.net/v/20230423114233323";
const EXCLUSION_NOTE: &str =
    "부동산 투기로 인한 가격 상승으로 인해 **산출가격 기준 초과**로 재개발 부지 선정에서 제외";
pub const NEWS_BUTTON_LABEL: &str = "재개발 관련 뉴스 정보 가져오기";

/// 평당 가격 페이지의 입력값. 구/동이 없거나 목록에 없으면 첫 번째 항목을 쓴다.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExplorerInputs {
    pub house_types: Vec<HouseType>,
    pub district: Option<String>,
    pub sub_district: Option<String>,
    pub map_house_type: HouseType,
}

impl Default for ExplorerInputs {
    fn default() -> Self {
        Self {
            house_types: vec![HouseType::Apartment],
            district: None,
            sub_district: None,
            map_house_type: HouseType::Apartment,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectControl {
    pub label: String,
    pub options: Vec<String>,
    pub selected: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceExplorerView {
    pub house_type_control: SelectControl,
    pub district_control: SelectControl,
    pub sub_district_control: SelectControl,
    pub price_chart: BarChart,
    pub map_house_type_control: SelectControl,
    pub map: MapView,
    pub sub_district_table: TableView,
}

fn house_type_names(types: &[HouseType]) -> Vec<String> {
    types.iter().map(|t| t.to_string()).collect()
}

fn choose(label: &str, options: Vec<String>, requested: Option<&str>) -> Result<(String, SelectControl)> {
    let selected = match requested {
        Some(value) if options.iter().any(|o| o == value) => value.to_string(),
        other => {
            if let Some(value) = other {
                warn!("{} '{}'이(가) 목록에 없어 첫 번째 항목을 선택합니다.", label, value);
            }
            options
                .first()
                .cloned()
                .ok_or_else(|| anyhow!("{}에 선택할 항목이 없습니다.", label))?
        }
    };

    let control = SelectControl {
        label: label.to_string(),
        options,
        selected: vec![selected.clone()],
    };
    Ok((selected, control))
}

/// 평당 가격 페이지 전체를 계산한다. 입력이 바뀔 때마다 다시 호출된다.
pub fn render_price_explorer(
    data_manager: &TransactionDataManager,
    inputs: &ExplorerInputs,
) -> Result<PriceExplorerView> {
    let df = data_manager.load_house_types(&inputs.house_types)?;
    let records = records_from_frame(&df)?;
    info!("평당 가격 페이지: {}개 유형, {}건 로드", inputs.house_types.len(), records.len());

    let (district, district_control) =
        choose("구 선택", district_options(&records), inputs.district.as_deref())?;
    let (sub_district, sub_district_control) = choose(
        "동 선택",
        sub_district_options(&records, &district),
        inputs.sub_district.as_deref(),
    )?;

    let price_chart = price_bar_chart(&records, &inputs.house_types, &district, &sub_district);

    // 지도는 막대 그래프와 별개로 선택한 유형 하나만 다시 읽는다
    let map_df = data_manager.load_house_type(inputs.map_house_type)?;
    let map_records = records_from_frame(&map_df)?;
    let map = column_map(&map_records, &sub_district);
    let sub_district_table = frame_to_table(&filter_eq(&map_df, BJDONG_NM, &sub_district)?)?;

    Ok(PriceExplorerView {
        house_type_control: SelectControl {
            label: String::from("건물 유형 선택"),
            options: house_type_names(&HouseType::ALL),
            selected: house_type_names(&inputs.house_types),
        },
        district_control,
        sub_district_control,
        price_chart,
        map_house_type_control: SelectControl {
            label: String::from("건물 유형 선택"),
            options: house_type_names(&HouseType::ALL),
            selected: vec![inputs.map_house_type.to_string()],
        },
        map,
        sub_district_table,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportSettings {
    pub seoul_data_file: String,
    pub excluded_sub_district: String,
    pub image_path: PathBuf,
    pub current_year: i32,
}

impl ReportSettings {
    pub fn from_config(config_manager: &ConfigManager) -> Self {
        Self {
            seoul_data_file: config_manager.config.data.seoul_data_file.clone(),
            excluded_sub_district: config_manager.config.report.excluded_sub_district.clone(),
            image_path: config_manager.get_image_path(),
            current_year: Local::now().year(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExclusionView {
    pub heading: String,
    pub note: String,
    pub table: TableView,
    pub related_article: EmbedView,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RedevelopmentReportView {
    pub old_building_ranking: Vec<DistrictCount>,
    pub old_building_chart: BarChart,
    pub old_transaction_ranking: Vec<DistrictCount>,
    pub old_transaction_chart: BarChart,
    pub exclusion: ExclusionView,
    pub selected_sites_image: ImageView,
    pub news_button_label: String,
}

/// 재개발 부지 선정 페이지를 계산한다. 뉴스는 버튼을 눌렀을 때 따로 가져온다.
pub fn render_redevelopment_report(
    data_manager: &TransactionDataManager,
    settings: &ReportSettings,
) -> Result<RedevelopmentReportView> {
    // 단독다가구, 연립다세대 병합
    let combined_df = data_manager.load_house_types(&[HouseType::DetachedHouse, HouseType::RowHouse])?;

    let seoul_df = data_manager.load_named_csv(&settings.seoul_data_file)?;
    let records = records_from_frame(&seoul_df)?;
    info!("재개발 페이지: 서울 전체 거래 {}건 로드", records.len());

    let old_building_ranking = rank_old_buildings(&records, settings.current_year);
    let old_building_chart =
        ranking_chart(&old_building_ranking, "노후 건물 개수 상위 10개 지역", "노후 건물수");

    let old_transaction_ranking = rank_old_transactions(&records, settings.current_year);
    let old_transaction_chart =
        ranking_chart(&old_transaction_ranking, "노후 건물 거래량 상위 10개 지역", "노후 건물 거래량");

    let excluded_df = filter_eq(&combined_df, BJDONG_NM, &settings.excluded_sub_district)?;
    let excluded_records = records_from_frame(&excluded_df)?;
    let heading = match excluded_records.first() {
        Some(r) => format!("{}을 재개발 부지에서 제외한 이유", r.district_label()),
        None => format!("{}을 재개발 부지에서 제외한 이유", settings.excluded_sub_district),
    };
    let table = frame_to_table(&relabel_excluded_frame(&excluded_df)?)?;

    if !settings.image_path.exists() {
        return Err(anyhow!("이미지 파일이 없습니다: {}", settings.image_path.display()));
    }

    Ok(RedevelopmentReportView {
        old_building_ranking,
        old_building_chart,
        old_transaction_ranking,
        old_transaction_chart,
        exclusion: ExclusionView {
            heading,
            note: EXCLUSION_NOTE.to_string(),
            table,
            related_article: EmbedView {
                label: String::from("관련 뉴스 보기"),
                url: RELATED_ARTICLE_URL.to_string(),
                width: String::from("100%"),
                height: String::from("900px"),
            },
        },
        selected_sites_image: ImageView {
            heading: String::from("재개발로 선정된 지역"),
            path: settings.image_path.to_string_lossy().into_owned(),
            caption: String::from("재개발 선정 지역"),
            width: 700,
        },
        news_button_label: NEWS_BUTTON_LABEL.to_string(),
    })
}
