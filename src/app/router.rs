use super::address_list::parse_addresses;

const ADDRESSES_PREFIX: &str = "/addresses";

/// Views reachable from a route path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Home,
    /// `/addresses/` or `/addresses/:addresses`; the parameter is kept verbatim.
    Addresses(Option<String>),
}

impl Route {
    /// Matches `path` against `/`, `/addresses/` and `/addresses/:addresses`.
    /// Everything after `/addresses/` is the parameter, `/` included.
    /// Anything else lands on [`Route::Home`].
    pub fn parse(path: &str) -> Self {
        let Some(rest) = path.strip_prefix(ADDRESSES_PREFIX) else {
            return Route::Home;
        };
        match rest {
            "" | "/" => Route::Addresses(None),
            _ => match rest.strip_prefix('/') {
                Some(param) => Route::Addresses(Some(param.to_string())),
                None => Route::Home,
            },
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Addresses(None) => format!("{ADDRESSES_PREFIX}/"),
            Route::Addresses(Some(param)) => format!("{ADDRESSES_PREFIX}/{param}"),
        }
    }

    pub fn is_addresses(&self) -> bool {
        matches!(self, Route::Addresses(_))
    }

    /// Address list carried by the route. Empty for every other view.
    pub fn addresses(&self) -> Vec<String> {
        match self {
            Route::Addresses(param) => parse_addresses(param.as_deref()),
            Route::Home => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_routes() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse("/addresses"), Route::Addresses(None));
        assert_eq!(Route::parse("/addresses/"), Route::Addresses(None));
        assert_eq!(
            Route::parse("/addresses/0xA 0xB"),
            Route::Addresses(Some("0xA 0xB".into()))
        );
    }

    #[test]
    fn parameter_is_taken_verbatim() {
        assert_eq!(
            Route::parse("/addresses/0xA/extra"),
            Route::Addresses(Some("0xA/extra".into()))
        );
        assert_eq!(
            Route::parse("/addresses/0xA%200xB").addresses(),
            vec!["0xA%200xB".to_string()]
        );
    }

    #[test]
    fn unknown_paths_fall_back_to_home() {
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/profile"), Route::Home);
        assert_eq!(Route::parse("/addressesfoo"), Route::Home);
    }

    #[test]
    fn path_reparses_to_same_route() {
        for route in [
            Route::Home,
            Route::Addresses(None),
            Route::Addresses(Some("0xA 0xB 0xA".into())),
        ] {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn home_carries_no_addresses() {
        assert!(Route::Home.addresses().is_empty());
        assert!(Route::Addresses(None).addresses().is_empty());
    }
}
