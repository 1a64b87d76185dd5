// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持英文（默认）和中文；通知正文均经此模块生成
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"en" 或 "zh-CN"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use class_timetable::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use class_timetable::i18n::t_with_args;
/// let msg = t_with_args("notification.cancellation", &[("subject", "Math")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    t_with_args_in(&current_locale(), key, args)
}

/// 按指定语言翻译消息（带参数），不读取全局语言
///
/// 排课引擎使用此函数，通知正文只由引擎参数决定。
pub fn t_with_args_in(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key, locale = locale).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // rust-i18n 的 locale 为全局状态，且 Rust 测试默认并行执行；
    // 为避免测试互相干扰，这里对 i18n 相关测试串行化。
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("zh-CN");
        assert_eq!(current_locale(), "zh-CN");

        set_locale("en");
        assert_eq!(current_locale(), "en");
    }

    #[test]
    fn test_translate_simple() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("zh-CN");
        assert_eq!(t("common.success"), "操作成功");

        set_locale("en");
        assert_eq!(t("common.success"), "Operation successful");
    }

    #[test]
    fn test_translate_substitution_with_args() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        let args = [
            ("teacher", "Ravi"),
            ("subject", "Physics"),
            ("day", "Monday"),
            ("slot", "9:30-10:30"),
        ];

        set_locale("en");
        let msg = t_with_args("notification.substitution", &args);
        assert_eq!(msg, "Ravi substituted for Physics on Monday 9:30-10:30");

        set_locale("zh-CN");
        let msg = t_with_args("notification.substitution", &args);
        assert!(msg.contains("Ravi"));
        assert!(msg.contains("代课"));

        set_locale("en");
    }

    #[test]
    fn test_translate_with_explicit_locale_ignores_global() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        let args = [("teacher", "Ravi"), ("subject", "Physics"), ("day", "Monday"), ("slot", "P1")];

        set_locale("en");
        let msg = t_with_args_in("zh-CN", "notification.substitution", &args);
        assert!(msg.contains("代课"));
        assert_eq!(current_locale(), "en");

        set_locale("zh-CN");
        let msg = t_with_args_in("en", "notification.substitution", &args);
        assert_eq!(msg, "Ravi substituted for Physics on Monday P1");

        set_locale("en");
    }
}
