use serde::{Deserialize, Serialize};

// 화면 구성 요소. 렌더링은 호스트 UI가 담당하고 여기서는 데이터만 만든다.

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BarPoint {
    pub x: String,
    /// 평균을 낼 데이터가 없으면 None
    pub y: Option<f64>,
    pub name: String,
    pub text: Option<String>,
    pub no_data: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub bars: Vec<BarPoint>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ViewState {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub pitch: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ColumnPoint {
    /// [경도, 위도]
    pub position: [f64; 2],
    pub elevation: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ColumnLayer {
    pub id: String,
    pub data: Vec<ColumnPoint>,
    pub elevation_scale: f64,
    pub radius: f64,
    pub fill_color: [u8; 4],
    pub pickable: bool,
    pub auto_highlight: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MapView {
    pub map_style: String,
    pub initial_view_state: ViewState,
    pub layers: Vec<ColumnLayer>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ImageView {
    pub heading: String,
    pub path: String,
    pub caption: String,
    pub width: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EmbedView {
    pub label: String,
    pub url: String,
    pub width: String,
    pub height: String,
}

/// 진행 상황 이벤트. `progress`가 None이고 `completed`이면 진행 표시를 지운다.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LoadingProgress {
    pub step: String,
    pub message: String,
    pub progress: Option<f64>,
    pub completed: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NewsLink {
    pub title: String,
    pub link: String,
}

impl NewsLink {
    pub fn to_markdown(&self) -> String {
        format!("[{}]({})", self.title, self.link)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NewsSection {
    pub query: String,
    pub heading: String,
    pub links: Vec<NewsLink>,
}
