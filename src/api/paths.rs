use crate::api::{ApiError, ApiResult};
use once_cell::sync::Lazy;
use regex::Regex;

pub const BASE: &str = "https://www.bungie.net";
pub const API_PATH: &str = "/Platform";

/// Shown for item types that have no icon of their own.
pub const MISSING_ICON: &str = "https://www.bungie.net/img/misc/missing_icon_d2.png";

/// Profile components that need a bearer token.
const PRIVATE_COMPONENTS: [u32; 5] = [102, 103, 201, 202, 204];

/// Prepend `prefix` unless `url` already contains it. Applying it twice is
/// the same as applying it once.
pub fn prefix_url(url: &str, prefix: &str) -> String {
    if prefix.is_empty() || url.contains(prefix) {
        url.to_string()
    } else {
        format!("{prefix}{url}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One remote endpoint, addressed by a path template such as
/// `/Destiny2/{membershipType}/Profile/{destinyMembershipId}/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub id: &'static str,
    pub method: Method,
    pub path: &'static str,
    pub secured: bool,
}

impl Operation {
    pub const GET_MEMBERSHIPS: Operation = Operation {
        id: "User.GetMembershipDataForCurrentUser",
        method: Method::Get,
        path: "/User/GetMembershipsForCurrentUser/",
        secured: true,
    };
    pub const GET_PROFILE: Operation = Operation {
        id: "Destiny2.GetProfile",
        method: Method::Get,
        path: "/Destiny2/{membershipType}/Profile/{destinyMembershipId}/",
        secured: false,
    };
    pub const GET_CHARACTER: Operation = Operation {
        id: "Destiny2.GetCharacter",
        method: Method::Get,
        path: "/Destiny2/{membershipType}/Profile/{destinyMembershipId}/Character/{characterId}/",
        secured: false,
    };
    pub const TRANSFER_ITEM: Operation = Operation {
        id: "Destiny2.TransferItem",
        method: Method::Post,
        path: "/Destiny2/Actions/Items/TransferItem/",
        secured: true,
    };
    pub const EQUIP_ITEM: Operation = Operation {
        id: "Destiny2.EquipItem",
        method: Method::Post,
        path: "/Destiny2/Actions/Items/EquipItem/",
        secured: true,
    };
    pub const GET_MANIFEST: Operation = Operation {
        id: "Destiny2.GetDestinyManifest",
        method: Method::Get,
        path: "/Destiny2/Manifest/",
        secured: false,
    };

    /// Whether the request has to carry the bearer token. Public endpoints
    /// still need it when they are asked for private components.
    pub fn needs_auth(&self, components: &[u32]) -> bool {
        self.secured || components.iter().any(|c| PRIVATE_COMPONENTS.contains(c))
    }

    /// Fill in the path template. Every placeholder must be supplied; the
    /// call is rejected before any I/O otherwise.
    pub fn expand(&self, params: &[(&str, &str)]) -> ApiResult<String> {
        static PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\w+)\}").unwrap());

        let lookup = |name: &str| params.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| *v);

        let missing: Vec<&str> = PARAM
            .captures_iter(self.path)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|name| lookup(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ApiError::MissingPathParam(missing.join(", ")));
        }

        let path = PARAM.replace_all(self.path, |caps: &regex::Captures<'_>| {
            caps.get(1).and_then(|m| lookup(m.as_str())).unwrap_or_default().to_string()
        });
        Ok(path.into_owned())
    }
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixing_is_idempotent() {
        let once = prefix_url("/common/destiny2_content/icons/abc.jpg", BASE);
        assert_eq!(once, "https://www.bungie.net/common/destiny2_content/icons/abc.jpg");
        assert_eq!(prefix_url(&once, BASE), once);
        assert_eq!(prefix_url("/x.png", ""), "/x.png");
    }

    #[test]
    fn expands_path_templates() {
        let path = Operation::GET_CHARACTER
            .expand(&[("membershipType", "3"), ("destinyMembershipId", "4611"), ("characterId", "2305")])
            .unwrap();
        assert_eq!(path, "/Destiny2/3/Profile/4611/Character/2305/");
    }

    #[test]
    fn missing_parameters_are_rejected() {
        let err = Operation::GET_CHARACTER.expand(&[("membershipType", "3")]).unwrap_err();
        match err {
            ApiError::MissingPathParam(names) => assert_eq!(names, "destinyMembershipId, characterId"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn private_components_need_auth() {
        assert!(!Operation::GET_PROFILE.needs_auth(&[100, 200]));
        assert!(Operation::GET_PROFILE.needs_auth(&[100, 201]));
        assert!(Operation::TRANSFER_ITEM.needs_auth(&[]));
    }
}
