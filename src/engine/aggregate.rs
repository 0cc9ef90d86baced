// ==========================================
// avisos 看板 - 聚合与指标
// ==========================================
// 职责: 分组均值、汇总指标、危急度分布、筛选项
// 红线: 无数据时返回 Metric::NoData，不产生 NaN
// ==========================================

use crate::domain::{Aviso, Field, Metric, Schema};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 分组统计结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStat {
    /// 分组值
    pub group: String,
    /// 组内记录数
    pub records: usize,
    /// 组内非缺失数值个数
    pub values: usize,
    /// 非缺失数值的均值
    pub mean: Metric,
}

/// 按分组列求数值列均值
///
/// # 说明
/// - 分组值缺失的记录不参与
/// - 任一列在结构中不存在 → 返回空结果
/// - 结果按分组值排序
pub fn aggregate_mean_by_group<'a, I>(
    records: I,
    schema: &Schema,
    group_column: &str,
    value_column: &str,
) -> Vec<GroupStat>
where
    I: IntoIterator<Item = &'a Aviso>,
{
    let (Some(group_field), Some(value_field)) =
        (schema.resolve(group_column), schema.resolve(value_column))
    else {
        tracing::warn!(
            "分组聚合列不存在: group='{}', value='{}'",
            group_column,
            value_column
        );
        return Vec::new();
    };

    // group → (记录数, 数值个数, 数值和)
    let mut acc: BTreeMap<String, (usize, usize, f64)> = BTreeMap::new();
    for aviso in records {
        let Some(group) = aviso.text_value(group_field).filter(|g| !g.is_empty()) else {
            continue;
        };
        let entry = acc.entry(group).or_insert((0, 0, 0.0));
        entry.0 += 1;
        if let Some(v) = aviso.numeric_value(value_field).filter(|v| v.is_finite()) {
            entry.1 += 1;
            entry.2 += v;
        }
    }

    acc.into_iter()
        .map(|(group, (records, values, sum))| GroupStat {
            group,
            records,
            values,
            mean: Metric::from_mean(sum, values),
        })
        .collect()
}

// ==========================================
// DashboardSummary - 汇总指标
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// 记录总数
    pub total: usize,
    /// 平均危急度
    pub mean_criticality: Metric,
    /// 已处理数
    pub managed: usize,
    /// 已处理占比（0-100）
    pub managed_pct: Metric,
}

impl DashboardSummary {
    pub fn compute<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Aviso>,
    {
        let mut total = 0usize;
        let mut managed = 0usize;
        let mut crit_sum = 0.0;
        let mut crit_count = 0usize;

        for aviso in records {
            total += 1;
            if aviso.managed {
                managed += 1;
            }
            if let Some(c) = aviso.criticality.filter(|c| c.is_finite()) {
                crit_sum += c;
                crit_count += 1;
            }
        }

        Self {
            total,
            mean_criticality: Metric::from_mean(crit_sum, crit_count),
            managed,
            managed_pct: Metric::from_mean(managed as f64 * 100.0, total),
        }
    }
}

/// 危急度分布的一个刻度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramBucket {
    pub level: u8,
    pub count: usize,
}

/// 危急度分布（1..=100，每个整数刻度一个桶，缺失值与非有限值跳过）
pub fn criticality_histogram<'a, I>(records: I) -> Vec<HistogramBucket>
where
    I: IntoIterator<Item = &'a Aviso>,
{
    let mut counts = [0usize; 100];
    for c in records
        .into_iter()
        .filter_map(|a| a.criticality)
        .filter(|c| c.is_finite())
    {
        let level = c.round().clamp(1.0, 100.0) as usize;
        counts[level - 1] += 1;
    }
    counts
        .iter()
        .enumerate()
        .map(|(idx, count)| HistogramBucket {
            level: (idx + 1) as u8,
            count: *count,
        })
        .collect()
}

/// 下拉筛选项：哨兵 + 去重排序后的非空值
pub fn filter_options<'a, I>(records: I, field: Field, sentinel: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a Aviso>,
{
    let distinct: BTreeSet<String> = records
        .into_iter()
        .filter_map(|a| a.text_value(field))
        .filter(|v| !v.is_empty())
        .collect();

    std::iter::once(sentinel.to_string())
        .chain(distinct)
        .collect()
}
