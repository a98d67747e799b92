use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};

/// 실거래가 데이터의 건물 유형. 각 유형은 `data/<이름>.csv` 파일 하나에 대응한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HouseType {
    #[serde(rename = "아파트")]
    Apartment,
    #[serde(rename = "단독다가구")]
    DetachedHouse,
    #[serde(rename = "오피스텔")]
    Officetel,
    #[serde(rename = "연립다세대")]
    RowHouse,
}

impl HouseType {
    /// 선택 박스에 표시되는 순서
    pub const ALL: [HouseType; 4] = [
        HouseType::Apartment,
        HouseType::DetachedHouse,
        HouseType::Officetel,
        HouseType::RowHouse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HouseType::Apartment => "아파트",
            HouseType::DetachedHouse => "단독다가구",
            HouseType::Officetel => "오피스텔",
            HouseType::RowHouse => "연립다세대",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.csv", self.as_str())
    }
}

impl fmt::Display for HouseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HouseType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HouseType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| anyhow!("알 수 없는 건물 유형: '{}'", s))
    }
}
