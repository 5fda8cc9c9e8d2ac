use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::JsValue;

pub fn format_time(secs: u64) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    if h > 0 {
        format!("{:01}:{:02}:{:02}", h, m, s)
    } else if m > 0 {
        format!("{:02}:{:02}", m, s)
    } else {
        format!("{}s", s)
    }
}

/// Forwards `log` records to the browser console.
struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!(
            "[{}] {}: {}",
            record.level(),
            record.target(),
            record.args()
        ));
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            _ => web_sys::console::log_1(&line),
        }
    }

    fn flush(&self) {}
}

/// Level from the page query string: `?debug` or `?trace` turn on the chatty ones.
pub fn level_from_query(query: &str) -> LevelFilter {
    let query = query.trim_start_matches('?');
    let has = |flag: &str| query.split('&').any(|kv| kv.split('=').next() == Some(flag));
    if has("trace") {
        LevelFilter::Trace
    } else if has("debug") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Install the console logger. Later calls only adjust the level.
pub fn init_logging(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_err() {
        log::debug!("console logger already installed");
    }
    log::set_max_level(level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_formats() {
        assert_eq!(format_time(5), "5s");
        assert_eq!(format_time(65), "01:05");
        assert_eq!(format_time(3725), "1:02:05");
    }

    #[test]
    fn query_levels() {
        assert_eq!(level_from_query(""), LevelFilter::Info);
        assert_eq!(level_from_query("?debug"), LevelFilter::Debug);
        assert_eq!(level_from_query("?x=1&debug=1"), LevelFilter::Debug);
        assert_eq!(level_from_query("?trace&debug"), LevelFilter::Trace);
        assert_eq!(level_from_query("?debugger"), LevelFilter::Info);
    }
}
