//! Browser-side setup

/// Route `log` to the browser console and panics to `console.error`
pub fn init_logging() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger already set: {e}").into());
    }
}

/// Wall clock in seconds
pub fn now_secs() -> f64 {
    js_sys::Date::now() / 1000.0
}
