// src/config/consts.rs

// Device
pub const DEFAULT_XML: &str = "Neu.xml";
pub const DEFAULT_IP: &str = "192.168.177.5";
pub const DEFAULT_USER: &str = "user";
pub const DEFAULT_DEVICE_NAME: &str = "UVR_TADesigner";
pub const DEFAULT_SETTINGS_FILE: &str = "config.json";

// Net
pub const SCHEMATIC_DIR: &str = "schematic_files";
pub const USER_AGENT: &str = concat!("uvr_scrape/", env!("CARGO_PKG_VERSION"));
pub const FETCH_TIMEOUT_SECS: u64 = 10;
pub const FETCH_ATTEMPTS: u32 = 3;
pub const BACKOFF_CAP_SECS: u64 = 30;
pub const DEBUG_HTML_PREFIX: &str = "debug_fetched_html_seite";

// Schema / markup markers
pub const PAGES_ELEMENT: &str = "Seiten";
pub const PAGE_PREFIX: &str = "Seite_";
pub const OBJECTS_ELEMENT: &str = "Objekte";
pub const LABEL_ATTR: &str = "Bezeichnung";
pub const TYPE_ATTR: &str = "Objekt_Typ";
pub const LABEL_SEPARATOR: &str = ": ";
pub const IMAGE_MARKER: &str = "Pic_Obj";
pub const COMPOUND_MARKER: &str = "Modus";
pub const MODE_SUFFIX: &str = "_mode";
pub const PERCENT_SUFFIX: &str = "_percent";

// Poll loop
pub const DEFAULT_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_CYCLES: u64 = 0; // 0 = run forever
pub const DEFAULT_WORKERS: usize = 1;
