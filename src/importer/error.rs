// ==========================================
// 监考排班系统 - 导入模块错误类型
// ==========================================
// 文件级错误中止导入; 行级错误只写入导入报告
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件级 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("缺少必需列: {0}")]
    MissingColumn(String),

    #[error("名册没有数据行: {0}")]
    EmptyRoster(String),

    // ===== 行级 =====
    #[error("第{row}行: 未知的星期标签 '{label}'")]
    UnknownWeekday { row: usize, label: String },

    #[error("第{row}行: 容量必须为正整数, 实际 '{value}'")]
    InvalidCapacity { row: usize, value: String },

    #[error("第{row}行: {message}")]
    RegistryRejected { row: usize, message: String },

    // ===== 通用 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 行级错误对应的源文件行号
    pub fn row(&self) -> Option<usize> {
        match self {
            ImportError::UnknownWeekday { row, .. }
            | ImportError::InvalidCapacity { row, .. }
            | ImportError::RegistryRejected { row, .. } => Some(*row),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
