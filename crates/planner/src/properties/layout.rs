//! Tables that account properties are read from.
//!
//! Each source is queried with `key IN (..)`, where the values come from the
//! `link` column of the anchor rows. A source may pull extra columns through
//! an inner-joined bridge table. In generated SQL the source table is
//! aliased `t` and the bridge `b`; computed column expressions use those
//! aliases.

use serde::{Deserialize, Serialize};

pub const SOURCE_ALIAS: &str = "t";
pub const BRIDGE_ALIAS: &str = "b";
pub const DEFAULT_CHUNK_SIZE: usize = 990;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySource {
    pub table: String,
    #[serde(default)]
    pub schema: Option<String>,
    /// Column compared against the link values.
    pub key: String,
    /// Anchor column supplying the key values.
    pub link: String,
    #[serde(default)]
    pub bridge: Option<Bridge>,
    /// Only rows holding the table-wide maximum of this column are read.
    #[serde(default)]
    pub latest: Option<String>,
    #[serde(default)]
    pub computed: Vec<ComputedColumn>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bridge {
    pub table: String,
    #[serde(default)]
    pub schema: Option<String>,
    /// Column of the source table.
    pub source_column: String,
    /// Column of the bridge table.
    pub bridge_column: String,
}

/// A derived column: a raw SQL expression evaluated on the source table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedColumn {
    pub name: String,
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyLayout {
    /// The account table. Its `key` is the account id.
    pub anchor: PropertySource,
    /// Merged onto the anchor rows in this order.
    pub sources: Vec<PropertySource>,
    pub chunk_size: usize,
}

impl PropertySource {
    pub fn new(table: &str, schema: Option<&str>, key: &str, link: &str) -> Self {
        Self {
            table: table.to_string(),
            schema: schema.map(str::to_string),
            key: key.to_string(),
            link: link.to_string(),
            bridge: None,
            latest: None,
            computed: Vec::new(),
        }
    }

    pub fn bridged(mut self, table: &str, source_column: &str, bridge_column: &str) -> Self {
        self.bridge = Some(Bridge {
            table: table.to_string(),
            schema: self.schema.clone(),
            source_column: source_column.to_string(),
            bridge_column: bridge_column.to_string(),
        });
        self
    }

    pub fn latest(mut self, column: &str) -> Self {
        self.latest = Some(column.to_string());
        self
    }

    pub fn computed(mut self, name: &str, expression: &str) -> Self {
        self.computed.push(ComputedColumn {
            name: name.to_string(),
            expression: expression.to_string(),
        });
        self
    }

    pub fn computed_column(&self, name: &str) -> Option<&ComputedColumn> {
        self.computed
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

impl PropertyLayout {
    /// The anchor followed by the sources, in attribution order.
    pub fn all_sources(&self) -> impl Iterator<Item = &PropertySource> {
        std::iter::once(&self.anchor).chain(self.sources.iter())
    }
}

const COUNTRY_LABEL: &str =
    "pa_rep_cust_fns.getCountryLabel(UPPER(COALESCE(t.country_of_legal_res, t.country)))";

impl Default for PropertyLayout {
    fn default() -> Self {
        let ibcust = Some("ibcust");
        let anchor = PropertySource::new("customeraccount_rtab", ibcust, "acct_id", "acct_id")
            .computed(
                "acct_type",
                "pa_rep_cust_fns.fn_getIBREPType(t.acct_id, 'WEEKLYCOMMREGSTAT')",
            )
            .computed("is_stl", "pa_rep_cust_fns.fn_isSTL(t.acct_id)")
            .computed("is_unreal", "pa_rep_cust_fns.fn_isUnrealAcct(t.acct_id)")
            .computed("is_margin_acct", "pa_rep_cust_fns.fn_isMarginAcct(t.acct_id)")
            .computed("is_ecp", "pa_rep_cust_fns.fn_isECP(t.applicant_id)");

        let sources = vec![
            PropertySource::new("applicant_rtab", ibcust, "id", "applicant_id")
                .computed("acct_country", COUNTRY_LABEL)
                .computed(
                    "acct_region",
                    &format!("pa_rep_cust_fns.fn_getIBREPContinent({COUNTRY_LABEL})"),
                ),
            PropertySource::new("accounthierarchy", ibcust, "sub_acct_id", "acct_id"),
            PropertySource::new("customeraccountusers_rtab", ibcust, "acct_id", "acct_id")
                .bridged("ibuser_rtab", "user_id", "id"),
            PropertySource::new("universalaccount_rtab", ibcust, "acct_id", "acct_id"),
            PropertySource::new("accountcapability_rtab", ibcust, "acct_id", "acct_id"),
            PropertySource::new("entityassoc_rtab", ibcust, "applicant_id", "applicant_id")
                .bridged("individual_rtab", "entity_id", "id"),
            PropertySource::new("rep_acct_fin_summary", None, "acct_id", "acct_id")
                .latest("weekending_latest"),
            PropertySource::new("acct_cash_bal_summ", None, "acct_id", "acct_id"),
        ];

        Self {
            anchor,
            sources,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}
