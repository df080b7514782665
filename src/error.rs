//! 错误类型
//!
//! 数据异常（未知 origin AS、不可达的 node/egress 对）不是错误，只记录在
//! [`crate::flow::Diagnostics`] 中；这里只有会中止整次生成的两类错误。

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    /// 输入或配置不可用
    #[error("configuration error: {0}")]
    Config(String),

    /// 输入文件某一行格式错误
    #[error("{source_name}:{line}: malformed record: {reason}")]
    Malformed {
        source_name: String,
        line: usize,
        reason: String,
    },

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// 内部状态不一致，说明是 bug 而不是数据问题
    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl GenError {
    pub fn config(msg: impl Into<String>) -> Self {
        GenError::Config(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        GenError::Invariant(msg.into())
    }

    pub fn malformed(source_name: impl Into<String>, line: usize, reason: impl Into<String>) -> Self {
        GenError::Malformed {
            source_name: source_name.into(),
            line,
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        GenError::Json {
            path: path.into(),
            source,
        }
    }

    /// 配置类错误（含 I/O 与解析失败）为 true；不变量违例为 false。
    pub fn is_configuration(&self) -> bool {
        !matches!(self, GenError::Invariant(_))
    }
}

pub type Result<T> = std::result::Result<T, GenError>;
