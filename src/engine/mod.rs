// ==========================================
// avisos 看板 - 引擎层
// ==========================================
// 职责: 内存记录仓、过滤、聚合、危急度配色
// 红线: 纯计算，不做 I/O
// ==========================================

pub mod aggregate;
pub mod color;
pub mod filter;
pub mod record_store;

pub use aggregate::{
    aggregate_mean_by_group, criticality_histogram, filter_options, DashboardSummary, GroupStat,
    HistogramBucket,
};
pub use color::{CriticalityColorMapper, Rgb, NEUTRAL_HEX};
pub use filter::{FilterCriteria, FilterValue, ALL_SENTINEL};
pub use record_store::{RecordEdit, RecordStore};
