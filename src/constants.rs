/// 列表接口默认分页大小
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// 列表接口最大分页大小
pub const MAX_PAGE_SIZE: u64 = 100;

/// 批量删除单次最多记录数
pub const MAX_BATCH_DELETE: usize = 200;

/// 基础统计 / 品牌统计默认回溯月数
pub const DEFAULT_SUMMARY_WINDOW_MONTHS: u32 = 1;

/// 趋势分析默认回溯天数
pub const DEFAULT_TREND_WINDOW_DAYS: u32 = 30;

/// 趋势分析区间最大天数（含首尾），约十年
pub const DEFAULT_MAX_RANGE_DAYS: u32 = 3660;

/// 评分上限（含）
pub const MAX_RATING: u8 = 10;

/// 单条记录价格上限，对应 DECIMAL(10, 2)
pub const MAX_PRICE_CENTS: i64 = 99_999_999_99;

pub const MAX_BRAND_NAME_CHARS: usize = 100;

pub const MAX_ATTRIBUTE_CHARS: usize = 50;

pub const MAX_COMMENT_CHARS: usize = 500;

/// 消费日期年份范围（含），存储键按四位年份排序
pub const MIN_CONSUME_YEAR: i32 = 1;

pub const MAX_CONSUME_YEAR: i32 = 9999;
