//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `CANVAS__*` 覆盖（双下划线表示嵌套，如 `CANVAS__BACKEND__BASE_URL=http://host:8000`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub backend: BackendSection,
    #[serde(default)]
    pub codelabs: CodelabsSection,
    #[serde(default)]
    pub catalog: CatalogSection,
    #[serde(default)]
    pub web: WebSection,
}

/// [app] 段：应用名、Agent 名、会话使用的模型
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    pub name: Option<String>,
    /// Agent 订阅共享状态时使用的名字
    #[serde(default = "default_agent_name")]
    pub agent_name: String,
    /// 写入 SessionState.model 的模型标识，会话开始后不再变化
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            agent_name: default_agent_name(),
            model: default_model(),
        }
    }
}

fn default_agent_name() -> String {
    "research_agent".to_string()
}

fn default_model() -> String {
    "openai".to_string()
}

/// [backend] 段：导出 / 源文档通知所用的后端地址与超时
#[derive(Debug, Clone, Deserialize)]
pub struct BackendSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// 导出 PDF 的保存目录
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
    #[serde(default = "default_pdf_file_name")]
    pub pdf_file_name: String,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            download_dir: default_download_dir(),
            pdf_file_name: default_pdf_file_name(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_pdf_file_name() -> String {
    "output.pdf".to_string()
}

/// [codelabs] 段：导出成功后打开的查看器地址
#[derive(Debug, Clone, Deserialize)]
pub struct CodelabsSection {
    #[serde(default = "default_viewer_url")]
    pub viewer_url: String,
}

impl Default for CodelabsSection {
    fn default() -> Self {
        Self {
            viewer_url: default_viewer_url(),
        }
    }
}

fn default_viewer_url() -> String {
    "http://localhost:9000".to_string()
}

/// [catalog] 段：可选的源文档列表（固定枚举）
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSection {
    #[serde(default = "default_documents")]
    pub documents: Vec<CatalogEntry>,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            documents: default_documents(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
}

fn default_documents() -> Vec<CatalogEntry> {
    [
        ("68db7e4f057f494fb5b939ba258cefcd", "Revisiting-the-Equity-Risk-Premium"),
        ("97b6383e18bb48d1b7daceb27ad0a198", "beyond-active-and-passive"),
        ("52af53cc2f5e42558253aa572a55b78a", "risk_compilation_2018"),
    ]
    .into_iter()
    .map(|(id, name)| CatalogEntry {
        id: id.to_string(),
        name: name.to_string(),
    })
    .collect()
}

/// [web] 段：Agent 桥接服务监听地址（需 web feature）
#[derive(Debug, Clone, Deserialize)]
pub struct WebSection {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebSection {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

/// 从 config 目录加载配置，环境变量 CANVAS__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 CANVAS__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("CANVAS")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
