// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持西班牙语（默认）和英文，用于命令行输出
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

pub const DEFAULT_LOCALE: &str = "es";

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"es" 或 "en"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 从 LANG 风格的值推断语言（"en_US.UTF-8" → "en"），其余回退为默认语言
pub fn locale_from_env_value(value: &str) -> &'static str {
    if value.to_lowercase().starts_with("en") {
        "en"
    } else {
        DEFAULT_LOCALE
    }
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use avisos_dashboard::i18n::t;
/// let msg = t("summary.total");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use avisos_dashboard::i18n::t_with_args;
/// let msg = t_with_args("errors.source_not_found", &[("path", "/tmp/avisos.xlsx")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}
