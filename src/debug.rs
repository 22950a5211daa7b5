//! Filterable debug logging for sheet navigation
//!
//! Categories: HISTORY, ROUTER, CACHE, LOADER, VALIDATE, NAV
//! Enable via: ?sheetdebug=all or sessionStorage/localStorage key `sheetnav.debug` = "history,router"
//! Native: `--debug history,nav` on the CLI, output goes through the `log` facade.

use std::sync::atomic::{AtomicU32, Ordering};

pub mod cat {
    pub const HISTORY: u32 = 1 << 0;
    pub const ROUTER: u32 = 1 << 1;
    pub const CACHE: u32 = 1 << 2;
    pub const LOADER: u32 = 1 << 3;
    pub const VALIDATE: u32 = 1 << 4;
    pub const NAV: u32 = 1 << 5;
    pub const ALL: u32 = 0xffff_ffff;
}

static MASK: AtomicU32 = AtomicU32::new(0);

#[inline]
pub fn mask() -> u32 {
    MASK.load(Ordering::Relaxed)
}

#[inline]
pub fn set(mask: u32) {
    MASK.store(mask, Ordering::Relaxed)
}

#[inline]
pub fn enable(bits: u32) {
    MASK.fetch_or(bits, Ordering::Relaxed);
}

#[inline]
pub fn disable(bits: u32) {
    MASK.fetch_and(!bits, Ordering::Relaxed);
}

#[inline]
pub fn is(cat: u32) -> bool {
    (MASK.load(Ordering::Relaxed) & cat) != 0
}

#[inline]
pub fn cat_name(cat: u32) -> &'static str {
    match cat {
        c if c == cat::HISTORY => "history",
        c if c == cat::ROUTER => "router",
        c if c == cat::CACHE => "cache",
        c if c == cat::LOADER => "loader",
        c if c == cat::VALIDATE => "validate",
        c if c == cat::NAV => "nav",
        _ => "misc",
    }
}

/// Parse a comma list like `"history,router"`, `"all"` or `"none"`.
pub fn parse_list(list: &str) -> u32 {
    let mut m: u32 = 0;
    for tok in list.split(',').map(|s| s.trim().to_ascii_lowercase()) {
        match tok.as_str() {
            "" => {}
            "none" => m = 0,
            "all" => m = cat::ALL,
            "history" => m |= cat::HISTORY,
            "router" => m |= cat::ROUTER,
            "cache" => m |= cat::CACHE,
            "loader" => m |= cat::LOADER,
            "validate" => m |= cat::VALIDATE,
            "nav" => m |= cat::NAV,
            other => log::warn!("unknown debug category '{other}'"),
        }
    }
    m
}

#[inline]
pub fn set_from_list(list: &str) {
    set(parse_list(list));
}

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub fn init_from_url_and_storage_once() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        use web_sys::window;
        let Some(win) = window() else {
            return;
        };
        // URL query: ?sheetdebug=history,router
        if let Ok(search) = win.location().search() {
            let qs = search.trim_start_matches('?');
            for part in qs.split('&') {
                let mut it = part.splitn(2, '=');
                let key = it.next().unwrap_or_default();
                let val = it.next().unwrap_or_default();
                if key.eq_ignore_ascii_case("sheetdebug") {
                    let decoded = urlencoding::decode(val)
                        .map(|v| v.into_owned())
                        .unwrap_or_else(|_| val.to_string());
                    set_from_list(&decoded);
                }
            }
        }
        // localStorage: sheetnav.debug = "history,nav"
        if let Ok(Some(storage)) = win.local_storage() {
            if let Ok(Some(v)) = storage.get_item("sheetnav.debug") {
                set_from_list(&v);
            }
        }
        log(cat::NAV, "debug init (wasm) complete");
    });
}

#[cfg(not(all(target_arch = "wasm32", feature = "web")))]
pub fn init_from_url_and_storage_once() {
    // Native builds configure the mask from the CLI.
}

#[cfg(all(target_arch = "wasm32", feature = "web"))]
#[inline]
pub fn log(cat: u32, msg: impl AsRef<str>) {
    if !is(cat) {
        return;
    }
    let s = format!("[sheet][{}] {}", cat_name(cat), msg.as_ref());
    web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(&s));
}

#[cfg(not(all(target_arch = "wasm32", feature = "web")))]
#[inline]
pub fn log(cat: u32, msg: impl AsRef<str>) {
    if !is(cat) {
        return;
    }
    log::debug!(target: "sheetnav::debug", "[{}] {}", cat_name(cat), msg.as_ref());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("history,router"), cat::HISTORY | cat::ROUTER);
        assert_eq!(parse_list(" NAV , cache "), cat::NAV | cat::CACHE);
        assert_eq!(parse_list("all"), cat::ALL);
        assert_eq!(parse_list("history,none"), 0);
        assert_eq!(parse_list(""), 0);
    }

    #[test]
    fn test_cat_names() {
        assert_eq!(cat_name(cat::LOADER), "loader");
        assert_eq!(cat_name(cat::VALIDATE), "validate");
        assert_eq!(cat_name(1 << 20), "misc");
    }
}
