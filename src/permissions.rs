//! Roles and the per-user menu permission matrix.
//!
//! Permissions are persisted as a JSON object, but older rows carry arrays,
//! JSON-in-a-string or doubly encoded strings. Everything read from storage goes
//! through [`normalize_permissions`] so callers only ever see the canonical map.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Admin,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "superadmin" => Ok(Role::Superadmin),
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MenuPermission {
    Dashboard,
    Brands,
    Stock,
    Reports,
    Activity,
    Profile,
    Staff,
}

impl MenuPermission {
    pub const ALL: [MenuPermission; 7] = [
        MenuPermission::Dashboard,
        MenuPermission::Brands,
        MenuPermission::Stock,
        MenuPermission::Reports,
        MenuPermission::Activity,
        MenuPermission::Profile,
        MenuPermission::Staff,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            MenuPermission::Dashboard => "dashboard",
            MenuPermission::Brands => "brands",
            MenuPermission::Stock => "stock",
            MenuPermission::Reports => "reports",
            MenuPermission::Activity => "activity",
            MenuPermission::Profile => "profile",
            MenuPermission::Staff => "staff",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }
}

/// Canonical permission map. Only the seven known keys can ever be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct Permissions(BTreeMap<MenuPermission, bool>);

impl Permissions {
    pub fn all() -> Self {
        Self(MenuPermission::ALL.into_iter().map(|p| (p, true)).collect())
    }

    /// Starting set for a freshly created staff account.
    pub fn staff_default() -> Self {
        let mut perms = Self::default();
        for p in [
            MenuPermission::Dashboard,
            MenuPermission::Stock,
            MenuPermission::Profile,
        ] {
            perms.set(p, true);
        }
        perms
    }

    pub fn get(&self, flag: MenuPermission) -> bool {
        self.0.get(&flag).copied().unwrap_or(false)
    }

    pub fn set(&mut self, flag: MenuPermission, value: bool) {
        self.0.insert(flag, value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drops flags a staff member may never hold.
    pub fn restrict_for_staff(mut self) -> Self {
        self.0.remove(&MenuPermission::Staff);
        self
    }

    pub fn to_value(&self) -> Value {
        let map = self
            .0
            .iter()
            .map(|(k, v)| (k.key().to_string(), Value::Bool(*v)))
            .collect();
        Value::Object(map)
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(normalize_permissions(Some(&raw)))
    }
}

/// Collapse any stored permission shape into the canonical map.
///
/// Objects keep their known boolean keys. Strings are decoded as JSON, twice
/// at most, to undo legacy double encoding. Any other shape yields `{}`.
pub fn normalize_permissions(raw: Option<&Value>) -> Permissions {
    let Some(raw) = raw else {
        return Permissions::default();
    };
    normalize_value(raw, 2)
}

fn normalize_value(raw: &Value, depth: u8) -> Permissions {
    match raw {
        Value::Object(map) => Permissions(
            map.iter()
                .filter_map(|(k, v)| Some((MenuPermission::from_key(k)?, v.as_bool()?)))
                .collect(),
        ),
        Value::String(s) if depth > 0 => match serde_json::from_str::<Value>(s) {
            Ok(inner) => normalize_value(&inner, depth - 1),
            Err(_) => Permissions::default(),
        },
        _ => Permissions::default(),
    }
}
