use serde::Serialize;
use std::collections::HashMap;

/// How the raw text of a field is turned into a typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    /// Independently-schemed payloads (`contexts`, `unstruct_event`) kept verbatim.
    Opaque,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Boolean(bool),
}

impl FieldValue {
    fn into_text(self) -> Option<String> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    fn into_number(self) -> Option<f64> {
        match self {
            FieldValue::Number(number) => Some(number),
            _ => None,
        }
    }

    fn into_boolean(self) -> Option<bool> {
        match self {
            FieldValue::Boolean(flag) => Some(flag),
            _ => None,
        }
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        FieldValue::Text(text)
    }
}

impl From<f64> for FieldValue {
    fn from(number: f64) -> Self {
        FieldValue::Number(number)
    }
}

impl From<bool> for FieldValue {
    fn from(flag: bool) -> Self {
        FieldValue::Boolean(flag)
    }
}

macro_rules! field_type {
    (String) => {
        String
    };
    (Number) => {
        f64
    };
    (Boolean) => {
        bool
    };
    (Opaque) => {
        String
    };
}

macro_rules! take_field {
    ($values:ident, $field:ident, String) => {
        $values.remove(stringify!($field)).and_then(FieldValue::into_text)
    };
    ($values:ident, $field:ident, Number) => {
        $values.remove(stringify!($field)).and_then(FieldValue::into_number)
    };
    ($values:ident, $field:ident, Boolean) => {
        $values.remove(stringify!($field)).and_then(FieldValue::into_boolean)
    };
    ($values:ident, $field:ident, Opaque) => {
        $values.remove(stringify!($field)).and_then(FieldValue::into_text)
    };
}

/// Declares the enriched event once: the struct and the static field table are
/// both generated from the same list, so they cannot drift apart.
macro_rules! enriched_event_schema {
    ($($(#[$group:meta])* $field:ident: $kind:ident,)*) => {
        /// A Snowplow enriched event. Every field is optional; the struct is never
        /// mutated once the shredder has built it.
        #[derive(Debug, Clone, Default, PartialEq, Serialize)]
        pub struct EnrichedEvent {
            $($(#[$group])* pub $field: Option<field_type!($kind)>,)*
        }

        /// Every field of [`EnrichedEvent`] with its coercion rule, in declaration order.
        pub static FIELDS: &[FieldSpec] = &[
            $(FieldSpec { name: stringify!($field), kind: FieldKind::$kind },)*
        ];

        impl EnrichedEvent {
            /// Builds an event from already coerced values. A value whose variant does
            /// not match the field kind is dropped.
            pub(crate) fn from_values(mut values: HashMap<&'static str, FieldValue>) -> Self {
                Self {
                    $($field: take_field!(values, $field, $kind),)*
                }
            }

            /// All fields in schema order, `None` where unset.
            pub fn values(&self) -> Vec<(&'static str, Option<FieldValue>)> {
                vec![
                    $((stringify!($field), self.$field.clone().map(FieldValue::from)),)*
                ]
            }
        }
    };
}

enriched_event_schema! {
    /// The application (site, game, app etc) this event belongs to.
    app_id: String,
    platform: String,

    // Date/time. Timestamps stay as text.
    etl_tstamp: String,
    collector_tstamp: String,
    dvce_tstamp: String,

    // Transaction (this logging event)
    event: String,
    event_id: String,
    txn_id: String,

    // Versioning
    name_tracker: String,
    v_tracker: String,
    v_collector: String,
    v_etl: String,

    // User and visit
    user_id: String,
    user_ipaddress: String,
    user_fingerprint: String,
    domain_userid: String,
    domain_sessionidx: Number,
    network_userid: String,

    // Location
    geo_country: String,
    geo_region: String,
    geo_city: String,
    geo_zipcode: String,
    geo_latitude: Number,
    geo_longitude: Number,
    geo_region_name: String,

    // Other IP lookups
    ip_isp: String,
    ip_org: String,
    ip_domain: String,
    ip_netspeed: String,

    // Page
    page_url: String,
    page_title: String,
    page_referrer: String,

    // Page URL components
    page_urlscheme: String,
    page_urlhost: String,
    page_urlport: Number,
    page_urlpath: String,
    page_urlquery: String,
    page_urlfragment: String,

    // Referrer URL components
    refr_urlscheme: String,
    refr_urlhost: String,
    refr_urlport: Number,
    refr_urlpath: String,
    refr_urlquery: String,
    refr_urlfragment: String,

    // Referrer details
    refr_medium: String,
    refr_source: String,
    refr_term: String,

    // Marketing
    mkt_medium: String,
    mkt_source: String,
    mkt_term: String,
    mkt_content: String,
    mkt_campaign: String,

    /// Custom contexts, not validated here.
    contexts: Opaque,

    // Structured event
    se_category: String,
    se_action: String,
    se_label: String,
    se_property: String,
    se_value: Number,

    /// Unstructured event, not validated here.
    unstruct_event: Opaque,

    // Ecommerce transaction (from querystring)
    tr_orderid: String,
    tr_affiliation: String,
    tr_total: String,
    tr_tax: String,
    tr_shipping: String,
    tr_city: String,
    tr_state: String,
    tr_country: String,

    // Ecommerce transaction item (from querystring)
    ti_orderid: String,
    ti_sku: String,
    ti_name: String,
    ti_category: String,
    ti_price: String,
    ti_quantity: String,

    // Page pings
    pp_xoffset_min: Number,
    pp_xoffset_max: Number,
    pp_yoffset_min: Number,
    pp_yoffset_max: Number,

    // User agent
    useragent: String,

    // Browser (from user-agent)
    br_name: String,
    br_family: String,
    br_version: String,
    br_type: String,
    br_renderengine: String,

    // Browser (from querystring)
    br_lang: String,
    br_features_pdf: Boolean,
    br_features_flash: Boolean,
    br_features_java: Boolean,
    br_features_director: Boolean,
    br_features_quicktime: Boolean,
    br_features_realplayer: Boolean,
    br_features_windowsmedia: Boolean,
    br_features_gears: Boolean,
    br_features_silverlight: Boolean,
    br_cookies: Boolean,
    br_colordepth: String,
    br_viewwidth: Number,
    br_viewheight: Number,

    // OS (from user-agent)
    os_name: String,
    os_family: String,
    os_manufacturer: String,
    os_timezone: String,

    // Device/Hardware (from user-agent)
    dvce_type: String,
    dvce_ismobile: Boolean,

    // Device (from querystring)
    dvce_screenwidth: Number,
    dvce_screenheight: Number,

    // Document
    doc_charset: String,
    doc_width: Number,
    doc_height: Number,
}

/// Looks up the coercion rule for a field name.
pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|spec| spec.name == name)
}
