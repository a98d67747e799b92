use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{Result, anyhow};
use configparser::ini::Ini;
use log::*;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    pub data: DataConfig,
    pub report: ReportConfig,
    pub news: NewsConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DataConfig {
    pub data_dir: String,
    pub seoul_data_file: String,
    pub image_path: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReportConfig {
    pub excluded_sub_district: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NewsConfig {
    pub client_id: String,
    pub client_secret: String,
    pub display: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data: DataConfig {
                data_dir: String::from("data"),
                seoul_data_file: String::from("Seoul_data.csv"),
                image_path: String::from("images/재개발 선정 지역.png"),
            },
            report: ReportConfig {
                excluded_sub_district: String::from("화곡동"),
            },
            news: NewsConfig {
                client_id: String::new(),
                client_secret: String::new(),
                display: 10,
            },
        }
    }
}

pub struct ConfigManager {
    config_path: PathBuf,
    pub config: AppConfig,
}

impl ConfigManager {
    /// 설정 파일이 없으면 기본값으로 새로 만든다.
    pub fn new(config_path: impl AsRef<Path>) -> Result<Self> {
        let config_path = config_path.as_ref().to_path_buf();

        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| anyhow!("Failed to create config directory: {}", e))?;
            }
        }

        let mut manager = ConfigManager {
            config_path,
            config: AppConfig::default(),
        };

        if manager.config_path.exists() {
            manager.load()?;
        } else {
            manager.create_default()?;
            manager.save()?;
        }

        Ok(manager)
    }

    pub fn load(&mut self) -> Result<()> {
        let config_str = fs::read_to_string(&self.config_path)?;
        let mut config_ini = Ini::new();
        config_ini.read(config_str).map_err(|e| anyhow!("Failed to read config string: {}", e))?;

        let mut app_config = AppConfig::default();

        if let Some(data_dir) = config_ini.get("data", "data_dir") {
            app_config.data.data_dir = data_dir;
        }
        if let Some(seoul_data_file) = config_ini.get("data", "seoul_data_file") {
            app_config.data.seoul_data_file = seoul_data_file;
        }
        if let Some(image_path) = config_ini.get("data", "image_path") {
            app_config.data.image_path = image_path;
        }

        if let Some(excluded) = config_ini.get("report", "excluded_sub_district") {
            app_config.report.excluded_sub_district = excluded;
        }

        if let Some(client_id) = config_ini.get("news", "client_id") {
            app_config.news.client_id = client_id;
        }
        if let Some(client_secret) = config_ini.get("news", "client_secret") {
            app_config.news.client_secret = client_secret;
        }
        if let Some(display_str) = config_ini.get("news", "display") {
            match display_str.parse::<u32>() {
                Ok(display) => app_config.news.display = display,
                Err(_) => warn!("news.display 값 '{}'을(를) 해석할 수 없어 기본값을 사용합니다.", display_str),
            }
        }

        self.config = app_config;
        self.validate()?;
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        let mut config_ini = Ini::new();

        config_ini.set("data", "data_dir", Some(self.config.data.data_dir.clone()));
        config_ini.set("data", "seoul_data_file", Some(self.config.data.seoul_data_file.clone()));
        config_ini.set("data", "image_path", Some(self.config.data.image_path.clone()));

        config_ini.set("report", "excluded_sub_district", Some(self.config.report.excluded_sub_district.clone()));

        config_ini.set("news", "client_id", Some(self.config.news.client_id.clone()));
        config_ini.set("news", "client_secret", Some(self.config.news.client_secret.clone()));
        config_ini.set("news", "display", Some(self.config.news.display.to_string()));

        config_ini.write(&self.config_path).map_err(|e| anyhow!("Failed to write config to file: {}", e))?;
        Ok(())
    }

    pub fn create_default(&mut self) -> Result<()> {
        self.config = AppConfig::default();
        info!("{} 파일이 생성되었습니다. 뉴스 검색을 사용하려면 client_id와 client_secret 값을 입력하세요.", self.config_path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.config.data.data_dir.trim().is_empty() {
            return Err(anyhow!("{}의 data_dir 값이 비어 있습니다.", self.config_path.display()));
        }

        // 뉴스 API 키가 없으면 경고만 출력하고 계속 진행
        if !self.has_news_credentials() {
            warn!("{}에 client_id와 client_secret 값을 입력하면 재개발 관련 뉴스를 가져올 수 있습니다.", self.config_path.display());
        }
        Ok(())
    }

    pub fn has_news_credentials(&self) -> bool {
        !self.config.news.client_id.trim().is_empty() && !self.config.news.client_secret.trim().is_empty()
    }

    /// 상대 경로는 설정 파일이 있는 디렉토리 기준으로 해석한다.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = PathBuf::from(path.trim());
        if path.is_absolute() {
            return path;
        }
        match self.config_path.parent() {
            Some(base) if !base.as_os_str().is_empty() => base.join(path),
            _ => path,
        }
    }

    pub fn get_data_dir(&self) -> PathBuf {
        self.resolve(&self.config.data.data_dir)
    }

    pub fn get_image_path(&self) -> PathBuf {
        self.resolve(&self.config.data.image_path)
    }
}
