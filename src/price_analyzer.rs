use std::collections::HashSet;

use crate::house_type::HouseType;
use crate::transaction_data_manager::TransactionRecord;
use crate::view_model::{BarChart, BarPoint, ColumnLayer, ColumnPoint, MapView, ViewState};

// 서울시청 좌표
pub const SEOUL_LATITUDE: f64 = 37.5665;
pub const SEOUL_LONGITUDE: f64 = 126.9780;
pub const MAP_STYLE: &str = "mapbox://styles/mapbox/light-v9";

const ELEVATION_SCALE: f64 = 0.5;

fn unique_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

/// 구 선택 박스 항목. 처음 나온 순서를 유지한다.
pub fn district_options(records: &[TransactionRecord]) -> Vec<String> {
    unique_in_order(records.iter().map(|r| r.sgg_nm.as_str()))
}

/// 선택한 구에 속한 동 선택 박스 항목
pub fn sub_district_options(records: &[TransactionRecord], district: &str) -> Vec<String> {
    unique_in_order(
        records
            .iter()
            .filter(|r| r.sgg_nm == district)
            .map(|r| r.bjdong_nm.as_str()),
    )
}

/// (구, 동, 건물 유형)에 해당하는 거래의 평균 평당 가격. 값이 없는 행은 무시하고,
/// 남는 값이 없으면 None.
pub fn mean_price_per(
    records: &[TransactionRecord],
    district: &str,
    sub_district: &str,
    house_type: HouseType,
) -> Option<f64> {
    let prices: Vec<f64> = records
        .iter()
        .filter(|r| r.sgg_nm == district && r.bjdong_nm == sub_district && r.house_type == house_type.as_str())
        .filter_map(|r| r.price_per)
        .collect();

    if prices.is_empty() {
        None
    } else {
        Some(prices.iter().sum::<f64>() / prices.len() as f64)
    }
}

pub fn price_bar_chart(
    records: &[TransactionRecord],
    house_types: &[HouseType],
    district: &str,
    sub_district: &str,
) -> BarChart {
    let bars = house_types
        .iter()
        .map(|&house_type| {
            let average = mean_price_per(records, district, sub_district, house_type);
            BarPoint {
                x: format!("{} 평균 가격", house_type),
                y: average,
                name: house_type.to_string(),
                text: None,
                no_data: average.is_none(),
            }
        })
        .collect();

    let type_names: Vec<&str> = house_types.iter().map(|t| t.as_str()).collect();

    BarChart {
        title: format!(
            "{}의 {}, {} 지역 1평당 평균 가격",
            type_names.join(", "),
            district,
            sub_district
        ),
        x_axis_title: String::from("House Type"),
        y_axis_title: String::from("1평당 평균 가격"),
        bars,
        width: None,
        height: None,
    }
}

fn column_points<'a>(records: impl Iterator<Item = &'a TransactionRecord>) -> Vec<ColumnPoint> {
    records
        .filter_map(|r| match (r.center_long, r.center_lati, r.price_per) {
            (Some(long), Some(lati), Some(price)) => Some(ColumnPoint {
                position: [long, lati],
                elevation: price,
            }),
            _ => None,
        })
        .collect()
}

/// 전체 거래와 선택한 동의 거래를 겹쳐 그리는 3D 막대 지도
pub fn column_map(records: &[TransactionRecord], sub_district: &str) -> MapView {
    let all_layer = ColumnLayer {
        id: String::from("all"),
        data: column_points(records.iter()),
        elevation_scale: ELEVATION_SCALE,
        radius: 200.0,
        fill_color: [255, 165, 0, 100],
        pickable: true,
        auto_highlight: true,
    };

    let selected_layer = ColumnLayer {
        id: String::from("selected"),
        data: column_points(records.iter().filter(|r| r.bjdong_nm == sub_district)),
        elevation_scale: ELEVATION_SCALE,
        radius: 100.0,
        fill_color: [0, 0, 255, 200],
        pickable: true,
        auto_highlight: true,
    };

    MapView {
        map_style: String::from(MAP_STYLE),
        initial_view_state: ViewState {
            latitude: SEOUL_LATITUDE,
            longitude: SEOUL_LONGITUDE,
            zoom: 10.0,
            pitch: 50.0,
        },
        layers: vec![all_layer, selected_layer],
    }
}
