use super::router::Route;

/// Splits the route parameter on single spaces. Absent or empty yields nothing.
///
/// Addresses are not validated and duplicates are kept in order.
pub fn parse_addresses(param: Option<&str>) -> Vec<String> {
    match param {
        None | Some("") => Vec::new(),
        Some(param) => param.split(' ').map(str::to_string).collect(),
    }
}

/// Route path listing `addresses` in order.
pub fn addresses_path(addresses: &[String]) -> String {
    if addresses.is_empty() {
        Route::Addresses(None).path()
    } else {
        Route::Addresses(Some(addresses.join(" "))).path()
    }
}

/// Path to navigate to after submitting `draft`, or `None` when the draft is empty.
pub fn submit_address(current: &[String], draft: &str) -> Option<String> {
    if draft.is_empty() {
        return None;
    }
    let mut next = current.to_vec();
    next.push(draft.to_string());
    Some(addresses_path(&next))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_handles_absent_and_empty() {
        assert!(parse_addresses(None).is_empty());
        assert!(parse_addresses(Some("")).is_empty());
        assert_eq!(parse_addresses(Some("0xA 0xB")), list(&["0xA", "0xB"]));
    }

    #[test]
    fn submit_appends_draft() {
        assert_eq!(
            submit_address(&list(&["0xA", "0xB"]), "0xC").as_deref(),
            Some("/addresses/0xA 0xB 0xC")
        );
        assert_eq!(
            submit_address(&[], "0xA").as_deref(),
            Some("/addresses/0xA")
        );
    }

    #[test]
    fn submit_keeps_duplicates() {
        assert_eq!(
            submit_address(&list(&["0xA"]), "0xA").as_deref(),
            Some("/addresses/0xA 0xA")
        );
    }

    #[test]
    fn empty_draft_does_not_navigate() {
        assert!(submit_address(&list(&["0xA"]), "").is_none());
    }

    #[test]
    fn list_survives_path_roundtrip() {
        let addresses = list(&["0xA", "0xB", "0xA", "0xC"]);
        let path = addresses_path(&addresses);
        assert_eq!(Route::parse(&path).addresses(), addresses);
        assert!(Route::parse(&addresses_path(&[])).addresses().is_empty());
    }

    #[test]
    fn submitted_address_with_slash_keeps_list() {
        let path = submit_address(&list(&["0xA"]), "0xB/1").expect("navigates");
        assert_eq!(path, "/addresses/0xA 0xB/1");
        assert_eq!(Route::parse(&path).addresses(), list(&["0xA", "0xB/1"]));
    }

    #[test]
    fn encoded_looking_addresses_are_not_split() {
        let addresses = list(&["a%20b", "0xC"]);
        assert_eq!(
            Route::parse(&addresses_path(&addresses)).addresses(),
            addresses
        );
    }
}
