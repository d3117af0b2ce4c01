//! Column-name constants for the order record table.
//! Single source of truth for every crate in the workspace.

// ── Canonical order columns ─────────────────────────────────────────────────
pub mod columns {
    pub const ORDER_TYPE: &str = "order_type";
    pub const RELEASE: &str = "release";
    pub const BRAND: &str = "brand";
    pub const PLANNED_DELIVERY_DATE: &str = "planned_delivery_date";
    pub const PLANNED_DELIVERY_MONTH: &str = "planned_delivery_month";
    pub const CREATION_YEARWEEK: &str = "creation_yearweek";
    pub const PLANNED_DELIVERY_YEARWEEK: &str = "planned_delivery_yearweek";
    pub const CUSTOMER_SOLD_TO: &str = "customer_sold_to";
    pub const CUSTOMER: &str = "customer";
    pub const DIVISION: &str = "division";
    pub const KEY_ACCOUNT_CODE: &str = "key_account_code";
    pub const DATEST_NAME: &str = "datest_name";
    pub const DATEST: &str = "datest";
    pub const DEDALO_AREA: &str = "dedalo_area";
    pub const ACQUISITION_MODE_DESC: &str = "acquisition_mode_desc";
    pub const ACQUISITION_MODE_GROUP: &str = "acquisition_mode_group";
    pub const ORDER_SPECIFICATION: &str = "order_specification";
    pub const CUSTOMER_TYPE: &str = "customer_type";
    pub const QTY: &str = "qty";
}

// ── Columns derived by the shaping stages ───────────────────────────────────
pub mod derived {
    pub const FIRST_ORDER: &str = "first_order";
    pub const NEW_ACQUISITION_MODE: &str = "new_acquisition_mode";
    pub const COMMON_CREATION_YEARWEEK: &str = "common_creation_yearweek";
    pub const COMMON_PLANNED_DELIVERY_YEARWEEK: &str = "common_planned_delivery_yearweek";
    pub const TILL_TODAY: &str = "till_today";
    pub const COMP: &str = "comp";
    pub const COMP_TODAY: &str = "comp_today";
    pub const OUTLIER: &str = "outlier";
    pub const COMP_NO_OUT: &str = "comp_no_out";
    pub const COMP_TODAY_NO_OUT: &str = "comp_today_no_out";
}

// ── Area lookup columns ─────────────────────────────────────────────────────
pub mod lookup {
    pub const LAUNCH_TYPE: &str = "launch_type";
    pub const DEFAULT_SHEET: &str = "AREA_EXPORT_DEDALO";
}

// ── Acquisition mode values ─────────────────────────────────────────────────
pub mod acquisition {
    pub const REP: &str = "REP";
    pub const RED_CARPET: &str = "RED CARPET";

    pub const REP_FIRST_ORDER: &str = "REP FIRST ORDER";
    pub const EVENT: &str = "EVENT";
    pub const REP_REPLENISHMENT: &str = "REP REPLENISHMENT";
    pub const REPLENISHMENT: &str = "REPLENISHMENT";
}

// ── Y/N flag values ─────────────────────────────────────────────────────────
pub mod flag {
    pub const YES: &str = "Y";
    pub const NO: &str = "N";
}

use columns::{
    ACQUISITION_MODE_DESC, ACQUISITION_MODE_GROUP, BRAND, CREATION_YEARWEEK, CUSTOMER,
    CUSTOMER_SOLD_TO, CUSTOMER_TYPE, DATEST, DATEST_NAME, DEDALO_AREA, DIVISION,
    KEY_ACCOUNT_CODE, ORDER_SPECIFICATION, ORDER_TYPE, PLANNED_DELIVERY_DATE,
    PLANNED_DELIVERY_MONTH, PLANNED_DELIVERY_YEARWEEK, QTY, RELEASE,
};

/// Source extract header → canonical column name.
pub const SOURCE_COLUMN_MAP: [(&str, &str); 19] = [
    ("SAP - Order Type", ORDER_TYPE),
    ("NPI_Release", RELEASE),
    ("Brand - code", BRAND),
    ("Calendar - Planned Delivery Date - Date", PLANNED_DELIVERY_DATE),
    ("Planned Delivery Date: Month", PLANNED_DELIVERY_MONTH),
    ("Calendar - Order Date - Year Week", CREATION_YEARWEEK),
    (
        "Calendar - Planned Delivery Date - Year Week",
        PLANNED_DELIVERY_YEARWEEK,
    ),
    ("Customer Sold To Description act", CUSTOMER_SOLD_TO),
    ("Customer: Code", CUSTOMER),
    ("SAP Optical/Sun/Clip On Desc", DIVISION),
    ("Orders - KeyAccountCode", KEY_ACCOUNT_CODE),
    ("Subsidiary Name", DATEST_NAME),
    ("Short Trip - Datest Code", DATEST),
    ("Short Trip - DEDALO Area", DEDALO_AREA),
    ("Acquisition Mode Desc", ACQUISITION_MODE_DESC),
    ("Acquisition Mode Group", ACQUISITION_MODE_GROUP),
    ("Orders - Specification", ORDER_SPECIFICATION),
    ("Customer Sales: GTM Rating", CUSTOMER_TYPE),
    ("No Return Frame - TOTAL Order Qty", QTY),
];

/// Canonical columns in output order.
pub const CANONICAL_COLUMNS: [&str; 19] = [
    ORDER_TYPE,
    RELEASE,
    BRAND,
    PLANNED_DELIVERY_DATE,
    PLANNED_DELIVERY_MONTH,
    CREATION_YEARWEEK,
    PLANNED_DELIVERY_YEARWEEK,
    CUSTOMER_SOLD_TO,
    CUSTOMER,
    DIVISION,
    KEY_ACCOUNT_CODE,
    DATEST_NAME,
    DATEST,
    DEDALO_AREA,
    ACQUISITION_MODE_DESC,
    ACQUISITION_MODE_GROUP,
    ORDER_SPECIFICATION,
    CUSTOMER_TYPE,
    QTY,
];

/// Canonical columns stored as `Int64`; every other canonical column is a string.
pub const INTEGER_COLUMNS: [&str; 3] = [CREATION_YEARWEEK, PLANNED_DELIVERY_YEARWEEK, QTY];

/// Dimension tuple that identifies a row after cleaning.
pub const GROUPING_KEYS: [&str; 9] = [
    RELEASE,
    BRAND,
    PLANNED_DELIVERY_YEARWEEK,
    CREATION_YEARWEEK,
    CUSTOMER,
    CUSTOMER_SOLD_TO,
    DIVISION,
    DEDALO_AREA,
    ACQUISITION_MODE_GROUP,
];

/// Group whose earliest creation week anchors the first-order window.
pub const FIRST_ORDER_KEYS: [&str; 4] = [RELEASE, BRAND, CUSTOMER, DEDALO_AREA];

/// Base group compared across releases.
pub const COMPARISON_KEYS: [&str; 4] = [
    BRAND,
    CUSTOMER,
    DEDALO_AREA,
    derived::NEW_ACQUISITION_MODE,
];

/// Peer group used for outlier detection.
pub const OUTLIER_KEYS: [&str; 3] = [BRAND, DEDALO_AREA, derived::NEW_ACQUISITION_MODE];

/// Look up the canonical name of a source header.
pub fn canonical_name(source_header: &str) -> Option<&'static str> {
    SOURCE_COLUMN_MAP
        .iter()
        .find(|(source, _)| *source == source_header)
        .map(|(_, canonical)| *canonical)
}

pub fn is_integer_column(name: &str) -> bool {
    INTEGER_COLUMNS.contains(&name)
}
