use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use polars::prelude::*;
use anyhow::{Result, anyhow};
use csv;
use log::*;

use crate::house_type::HouseType;
use crate::view_model::TableView;

pub const HOUSE_TYPE: &str = "HOUSE_TYPE";
pub const SGG_CD: &str = "SGG_CD";
pub const SGG_NM: &str = "SGG_NM";
pub const BJDONG_CD: &str = "BJDONG_CD";
pub const BJDONG_NM: &str = "BJDONG_NM";
pub const BLDG_NM: &str = "BLDG_NM";
pub const BUILD_YEAR: &str = "BUILD_YEAR";
pub const PRICE_PER: &str = "PRICE_PER";
pub const CENTER_LONG: &str = "CENTER_LONG";
pub const CENTER_LATI: &str = "CENTER_LATI";

/// 모든 실거래가 CSV에 있어야 하는 컬럼
pub const REQUIRED_COLUMNS: [&str; 10] = [
    HOUSE_TYPE,
    SGG_CD,
    SGG_NM,
    BJDONG_CD,
    BJDONG_NM,
    BLDG_NM,
    BUILD_YEAR,
    PRICE_PER,
    CENTER_LONG,
    CENTER_LATI,
];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TransactionRecord {
    #[serde(rename = "HOUSE_TYPE")]
    pub house_type: String,
    #[serde(rename = "SGG_CD")]
    pub sgg_cd: Option<String>,
    #[serde(rename = "SGG_NM")]
    pub sgg_nm: String,
    #[serde(rename = "BJDONG_CD")]
    pub bjdong_cd: Option<String>,
    #[serde(rename = "BJDONG_NM")]
    pub bjdong_nm: String,
    #[serde(rename = "BLDG_NM")]
    pub bldg_nm: Option<String>,
    #[serde(rename = "BUILD_YEAR")]
    pub build_year: Option<i32>,
    #[serde(rename = "PRICE_PER")]
    pub price_per: Option<f64>,
    #[serde(rename = "CENTER_LONG")]
    pub center_long: Option<f64>,
    #[serde(rename = "CENTER_LATI")]
    pub center_lati: Option<f64>,
}

impl TransactionRecord {
    /// "구 동" 형태의 지역 이름
    pub fn district_label(&self) -> String {
        format!("{} {}", self.sgg_nm, self.bjdong_nm)
    }
}

#[derive(Clone)]
pub struct TransactionDataManager {
    data_dir_path: PathBuf,
}

impl TransactionDataManager {
    pub fn new(data_dir_path: impl Into<PathBuf>) -> Self {
        TransactionDataManager {
            data_dir_path: data_dir_path.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir_path
    }

    pub fn house_type_path(&self, house_type: HouseType) -> PathBuf {
        self.data_dir_path.join(house_type.file_name())
    }

    pub fn load_house_type(&self, house_type: HouseType) -> Result<DataFrame> {
        self.load_csv(&self.house_type_path(house_type))
    }

    /// 선택한 유형의 CSV를 모두 읽어 하나로 합친다. 선택이 비어 있으면 에러.
    pub fn load_house_types(&self, house_types: &[HouseType]) -> Result<DataFrame> {
        if house_types.is_empty() {
            return Err(anyhow!("선택된 건물 유형이 없습니다."));
        }

        let mut all_dataframes = Vec::with_capacity(house_types.len());
        for &house_type in house_types {
            all_dataframes.push(self.load_house_type(house_type)?);
        }

        stack_frames(all_dataframes)
    }

    pub fn load_named_csv(&self, file_name: &str) -> Result<DataFrame> {
        self.load_csv(&self.data_dir_path.join(file_name))
    }

    fn load_csv(&self, path: &Path) -> Result<DataFrame> {
        if !path.exists() {
            return Err(anyhow!("데이터 파일이 없습니다: {}", path.display()));
        }

        // 헤더를 먼저 확인해서 필수 컬럼이 빠진 파일은 바로 실패시킨다
        let mut csv_reader = csv::Reader::from_path(path)
            .map_err(|e| anyhow!("Failed to open CSV file {}: {}", path.display(), e))?;
        let headers = csv_reader.headers()
            .map_err(|e| anyhow!("Failed to read CSV headers from {}: {}", path.display(), e))?
            .clone();

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|required| !headers.iter().any(|h| h.trim_start_matches('\u{feff}') == *required))
            .collect();
        if !missing.is_empty() {
            return Err(anyhow!("{}에 필수 컬럼이 없습니다: {}", path.display(), missing.join(", ")));
        }

        let df = CsvReader::from_path(path)
            .map_err(|e| anyhow!("Failed to open data file {}: {}", path.display(), e))?
            .has_header(true)
            .infer_schema(None)
            .with_ignore_errors(true)
            .finish()
            .map_err(|e| anyhow!("Failed to read CSV {}: {}", path.display(), e))?;

        debug!("{} 로드 완료: {}행", path.display(), df.height());
        Ok(df)
    }
}

/// 여러 DataFrame을 세로로 합친다. 공통 컬럼만 남기고, 타입이 다른 컬럼은
/// 숫자끼리면 Float64로, 아니면 String으로 맞춘다.
pub fn stack_frames(frames: Vec<DataFrame>) -> Result<DataFrame> {
    let mut iter = frames.into_iter();
    let first = iter.next().ok_or_else(|| anyhow!("합칠 데이터가 없습니다."))?;
    let rest: Vec<DataFrame> = iter.collect();

    let shared: Vec<String> = first
        .get_column_names()
        .into_iter()
        .filter(|name| rest.iter().all(|df| df.column(name).is_ok()))
        .map(|name| name.to_string())
        .collect();

    let mut combined = first.select(shared.iter().map(|s| s.as_str()))?;
    for df in rest {
        let mut df = df.select(shared.iter().map(|s| s.as_str()))?;
        for name in &shared {
            let left = combined.column(name)?.dtype().clone();
            let right = df.column(name)?.dtype().clone();
            if left == right {
                continue;
            }
            let target = if left.is_numeric() && right.is_numeric() {
                DataType::Float64
            } else {
                DataType::String
            };
            let left_cast = combined.column(name)?.cast(&target)?;
            combined.with_column(left_cast)?;
            let right_cast = df.column(name)?.cast(&target)?;
            df.with_column(right_cast)?;
        }
        combined.vstack_mut(&df)?;
    }

    Ok(combined)
}

/// `column == value`인 행만 남긴다.
pub fn filter_eq(df: &DataFrame, column: &str, value: &str) -> Result<DataFrame> {
    let filtered = df
        .clone()
        .lazy()
        .filter(col(column).cast(DataType::String).eq(lit(value)))
        .collect()
        .map_err(|e| anyhow!("{} 컬럼 필터링 실패: {}", column, e))?;
    Ok(filtered)
}

fn str_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df
        .column(name)
        .map_err(|e| anyhow!("{} 컬럼 없음: {}", name, e))?
        .cast(&DataType::String)?;
    let values = series
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect();
    Ok(values)
}

/// 숫자로 바꿀 수 없는 값이 하나라도 있으면 에러. 빈 칸만 null로 남는다.
pub fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|e| anyhow!("{} 컬럼 없음: {}", name, e))?;
    let series = column.cast(&DataType::Float64)?;
    if series.null_count() != column.null_count() {
        return Err(anyhow!(
            "{} 컬럼에 숫자가 아닌 값이 {}개 있습니다.",
            name,
            series.null_count() - column.null_count()
        ));
    }
    let values = series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

fn whole_year(value: Option<f64>, row: usize) -> Result<Option<i32>> {
    match value {
        Some(y) if y.fract() != 0.0 => Err(anyhow!("{}번째 행의 {}가 정수가 아닙니다: {}", row, BUILD_YEAR, y)),
        Some(y) => Ok(Some(y as i32)),
        None => Ok(None),
    }
}

/// DataFrame을 행 단위 레코드로 변환한다.
pub fn records_from_frame(df: &DataFrame) -> Result<Vec<TransactionRecord>> {
    let house_type_col = str_values(df, HOUSE_TYPE)?;
    let sgg_cd_col = str_values(df, SGG_CD)?;
    let sgg_nm_col = str_values(df, SGG_NM)?;
    let bjdong_cd_col = str_values(df, BJDONG_CD)?;
    let bjdong_nm_col = str_values(df, BJDONG_NM)?;
    let bldg_nm_col = str_values(df, BLDG_NM)?;
    let build_year_col = f64_values(df, BUILD_YEAR)?;
    let price_per_col = f64_values(df, PRICE_PER)?;
    let center_long_col = f64_values(df, CENTER_LONG)?;
    let center_lati_col = f64_values(df, CENTER_LATI)?;

    let mut records = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        records.push(TransactionRecord {
            house_type: house_type_col[i].clone().unwrap_or_default(),
            sgg_cd: sgg_cd_col[i].clone(),
            sgg_nm: sgg_nm_col[i].clone().unwrap_or_default(),
            bjdong_cd: bjdong_cd_col[i].clone(),
            bjdong_nm: bjdong_nm_col[i].clone().unwrap_or_default(),
            bldg_nm: bldg_nm_col[i].clone(),
            build_year: whole_year(build_year_col[i], i)?,
            price_per: price_per_col[i],
            center_long: center_long_col[i],
            center_lati: center_lati_col[i],
        });
    }

    Ok(records)
}

/// 표시용 표. 모든 값을 문자열로 바꾸고 null은 빈 칸으로 둔다.
pub fn frame_to_table(df: &DataFrame) -> Result<TableView> {
    let columns: Vec<String> = df.get_column_names().iter().map(|c| c.to_string()).collect();

    let mut column_values = Vec::with_capacity(columns.len());
    for name in &columns {
        column_values.push(str_values(df, name)?);
    }

    let rows = (0..df.height())
        .map(|i| {
            column_values
                .iter()
                .map(|values| values[i].clone().unwrap_or_default())
                .collect()
        })
        .collect();

    Ok(TableView { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const HEADER: &str = "HOUSE_TYPE,SGG_CD,SGG_NM,BJDONG_CD,BJDONG_NM,BLDG_NM,BUILD_YEAR,PRICE_PER,CENTER_LONG,CENTER_LATI";

    fn write_csv(dir: &Path, file_name: &str, rows: &[&str]) {
        let mut content = String::from(HEADER);
        for row in rows {
            content.push('\n');
            content.push_str(row);
        }
        content.push('\n');
        fs::write(dir.join(file_name), content).unwrap();
    }

    #[test]
    fn loads_and_converts_records() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            dir.path(),
            "아파트.csv",
            &[
                "아파트,11500,강서구,10300,화곡동,우장산아이파크,2008,3100.5,126.84,37.54",
                "아파트,11500,강서구,10300,화곡동,,,,,",
            ],
        );

        let manager = TransactionDataManager::new(dir.path());
        let df = manager.load_house_type(HouseType::Apartment).unwrap();
        let records = records_from_frame(&df).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sgg_cd.as_deref(), Some("11500"));
        assert_eq!(records[0].build_year, Some(2008));
        assert_eq!(records[0].price_per, Some(3100.5));
        assert_eq!(records[0].district_label(), "강서구 화곡동");
        assert_eq!(records[1].bldg_nm, None);
        assert_eq!(records[1].price_per, None);
    }

    #[test]
    fn non_numeric_price_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            dir.path(),
            "아파트.csv",
            &[
                "아파트,11500,강서구,10300,화곡동,A,2000,100,126.8,37.5",
                "아파트,11500,강서구,10300,화곡동,B,2001,200,126.8,37.5",
                "아파트,11500,강서구,10300,화곡동,C,2002,abc,126.8,37.5",
            ],
        );

        let manager = TransactionDataManager::new(dir.path());
        let df = manager.load_house_type(HouseType::Apartment).unwrap();
        let err = records_from_frame(&df).unwrap_err();
        assert!(err.to_string().contains(PRICE_PER));
    }

    #[test]
    fn fractional_build_year_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "아파트.csv", &["아파트,11500,강서구,10300,화곡동,A,2006.5,100,126.8,37.5"]);

        let manager = TransactionDataManager::new(dir.path());
        let df = manager.load_house_type(HouseType::Apartment).unwrap();
        let err = records_from_frame(&df).unwrap_err();
        assert!(err.to_string().contains(BUILD_YEAR));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let manager = TransactionDataManager::new(dir.path());
        assert!(manager.load_house_type(HouseType::Officetel).is_err());
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("오피스텔.csv"), "HOUSE_TYPE,SGG_NM\n오피스텔,마포구\n").unwrap();

        let manager = TransactionDataManager::new(dir.path());
        let err = manager.load_house_type(HouseType::Officetel).unwrap_err();
        assert!(err.to_string().contains("PRICE_PER"));
    }

    #[test]
    fn empty_selection_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let manager = TransactionDataManager::new(dir.path());
        assert!(manager.load_house_types(&[]).is_err());
    }

    #[test]
    fn stacks_frames_with_mismatched_numeric_types() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "단독다가구.csv", &["단독다가구,11500,강서구,10300,화곡동,,1990,2000,126.8,37.5"]);
        write_csv(dir.path(), "연립다세대.csv", &["연립다세대,11500,강서구,10300,화곡동,빌라,1995,2500.5,126.8,37.5"]);

        let manager = TransactionDataManager::new(dir.path());
        let df = manager
            .load_house_types(&[HouseType::DetachedHouse, HouseType::RowHouse])
            .unwrap();

        assert_eq!(df.height(), 2);
        let records = records_from_frame(&df).unwrap();
        assert_eq!(records[0].price_per, Some(2000.0));
        assert_eq!(records[1].price_per, Some(2500.5));
    }

    #[test]
    fn filters_and_tabulates() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            dir.path(),
            "아파트.csv",
            &[
                "아파트,11500,강서구,10300,화곡동,A,2000,100,126.8,37.5",
                "아파트,11500,강서구,10400,가양동,B,2001,200,126.8,37.5",
            ],
        );

        let manager = TransactionDataManager::new(dir.path());
        let df = manager.load_house_type(HouseType::Apartment).unwrap();
        let filtered = filter_eq(&df, BJDONG_NM, "가양동").unwrap();
        let table = frame_to_table(&filtered).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.columns.len(), REQUIRED_COLUMNS.len());
        let idx = table.column_index(BLDG_NM).unwrap();
        assert_eq!(table.rows[0][idx], "B");
    }
}
