use std::collections::{BTreeMap, HashSet};

use anyhow::{Result, anyhow};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::house_type::HouseType;
use crate::transaction_data_manager::{
    f64_values, TransactionRecord, BJDONG_NM, CENTER_LATI, CENTER_LONG, HOUSE_TYPE, PRICE_PER, SGG_NM,
};
use crate::view_model::{BarChart, BarPoint};

pub const OLD_BUILDING_AGE: i32 = 20;
pub const TOP_N: usize = 10;

/// 거래량 순위에 포함하는 건물 유형
pub const LOW_RISE_TYPES: [HouseType; 2] = [HouseType::RowHouse, HouseType::DetachedHouse];

/// 제외 지역 표에서 한글로 바꿔 보여줄 컬럼
pub const KOREAN_COLUMN_NAMES: [(&str, &str); 6] = [
    (HOUSE_TYPE, "건물유형"),
    (PRICE_PER, "평균 평당가격"),
    (BJDONG_NM, "법정동 명"),
    (SGG_NM, "구 명"),
    (CENTER_LONG, "경도"),
    (CENTER_LATI, "위도"),
];

pub const PRICE_UNIT: &str = "만원";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum AgeCategory {
    #[serde(rename = "20년 이상")]
    Old,
    #[serde(rename = "20년 미만")]
    Recent,
}

impl AgeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeCategory::Old => "20년 이상",
            AgeCategory::Recent => "20년 미만",
        }
    }
}

pub fn building_age(current_year: i32, build_year: i32) -> i32 {
    current_year - build_year
}

/// 준공 연도가 없으면 나이를 알 수 없으므로 20년 미만으로 분류된다.
pub fn age_category(current_year: i32, build_year: Option<i32>) -> AgeCategory {
    match build_year {
        Some(year) if building_age(current_year, year) >= OLD_BUILDING_AGE => AgeCategory::Old,
        _ => AgeCategory::Recent,
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DistrictCount {
    pub district: String,
    pub sub_district: String,
    pub label: String,
    pub count: usize,
}

/// (구 코드, 동 코드, 건물명, 준공 연도)가 같은 거래는 같은 건물로 보고 첫 번째만 남긴다.
pub fn dedup_buildings(records: &[TransactionRecord]) -> Vec<TransactionRecord> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| {
            seen.insert((
                r.sgg_cd.clone(),
                r.bjdong_cd.clone(),
                r.bldg_nm.clone(),
                r.build_year,
            ))
        })
        .cloned()
        .collect()
}

fn old_records<'a>(
    records: &'a [TransactionRecord],
    current_year: i32,
) -> impl Iterator<Item = &'a TransactionRecord> {
    records
        .iter()
        .filter(move |r| age_category(current_year, r.build_year) == AgeCategory::Old)
}

/// 개수 내림차순 상위 n개. 키 순으로 정렬된 그룹에 안정 정렬을 적용하므로
/// 개수가 같으면 키의 사전순이 앞선 쪽이 먼저 온다.
fn top_counts(groups: BTreeMap<(String, String), usize>, n: usize) -> Vec<DistrictCount> {
    let mut counts: Vec<DistrictCount> = groups
        .into_iter()
        .map(|((district, sub_district), count)| DistrictCount {
            label: format!("{} {}", district, sub_district),
            district,
            sub_district,
            count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(n);
    counts
}

/// 20년 이상 된 건물 수 상위 지역. 건물은 중복 제거 후 센다.
pub fn rank_old_buildings(records: &[TransactionRecord], current_year: i32) -> Vec<DistrictCount> {
    let buildings = dedup_buildings(records);

    // 구/동 이름이 비어 있는 행은 그룹에서 빠진다
    let mut groups: BTreeMap<(String, String), usize> = BTreeMap::new();
    for r in old_records(&buildings, current_year) {
        if r.sgg_nm.is_empty() || r.bjdong_nm.is_empty() {
            continue;
        }
        *groups.entry((r.sgg_nm.clone(), r.bjdong_nm.clone())).or_insert(0) += 1;
    }

    top_counts(groups, TOP_N)
}

/// 단독다가구·연립다세대 중 20년 이상 된 건물의 거래량 상위 지역
pub fn rank_old_transactions(records: &[TransactionRecord], current_year: i32) -> Vec<DistrictCount> {
    let mut groups: BTreeMap<(String, String), usize> = BTreeMap::new();
    for r in old_records(records, current_year) {
        if !LOW_RISE_TYPES.iter().any(|t| t.as_str() == r.house_type) {
            continue;
        }
        if r.sgg_nm.is_empty() || r.bjdong_nm.is_empty() {
            continue;
        }
        *groups.entry((r.sgg_nm.clone(), r.bjdong_nm.clone())).or_insert(0) += 1;
    }

    top_counts(groups, TOP_N)
}

pub fn ranking_chart(ranking: &[DistrictCount], title: &str, count_label: &str) -> BarChart {
    let bars = ranking
        .iter()
        .map(|c| BarPoint {
            x: c.label.clone(),
            y: Some(c.count as f64),
            name: c.label.clone(),
            text: Some(c.count.to_string()),
            no_data: false,
        })
        .collect();

    BarChart {
        title: title.to_string(),
        x_axis_title: String::from("지역"),
        y_axis_title: count_label.to_string(),
        bars,
        width: Some(1100),
        height: Some(500),
    }
}

/// 평당 가격을 정수로 반올림하고 단위를 붙인다. 0.5는 가까운 짝수로 간다.
pub fn format_price(price: f64) -> String {
    format!("{}{}", price.round_ties_even() as i64, PRICE_UNIT)
}

/// 제외 지역 표: 컬럼 이름을 한글로 바꾸고 평당 가격을 "N만원" 문자열로 바꾼다.
/// 가격이 빠진 행이 있으면 에러.
pub fn relabel_excluded_frame(df: &DataFrame) -> Result<DataFrame> {
    let prices = f64_values(df, PRICE_PER)?;

    let mut formatted = Vec::with_capacity(df.height());
    for (i, price) in prices.into_iter().enumerate() {
        match price {
            Some(p) if p.is_finite() => formatted.push(format_price(p)),
            _ => return Err(anyhow!("{}번째 행의 평당 가격이 비어 있어 정수로 변환할 수 없습니다.", i)),
        }
    }

    let mut relabeled = df.clone();
    relabeled.with_column(Series::new(PRICE_PER, formatted))?;
    for (from, to) in KOREAN_COLUMN_NAMES {
        relabeled
            .rename(from, to)
            .map_err(|e| anyhow!("{} 컬럼 이름 변경 실패: {}", from, e))?;
    }

    Ok(relabeled)
}
