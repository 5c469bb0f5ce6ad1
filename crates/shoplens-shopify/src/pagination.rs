//! Cursor extraction for Shopify's `Link`-header pagination.
//!
//! Paginated list endpoints answer with a header of the form
//! `<https://shop/admin/api/…?page_info=abc&limit=250>; rel="next"`.
//! The only state worth keeping between pages is the `page_info` cursor.

/// Extracts the `page_info` cursor of the `rel="next"` link, if any.
#[must_use]
pub(crate) fn next_page_info(link_header: Option<&str>) -> Option<String> {
    let header = link_header?;
    for part in header.split(',') {
        let part = part.trim();
        if !part.contains("rel=\"next\"") {
            continue;
        }
        let url = part.strip_prefix('<')?.split('>').next()?;
        return page_info_param(url);
    }
    None
}

/// Pulls the `page_info` query parameter out of a raw URL string.
fn page_info_param(url: &str) -> Option<String> {
    let query = url.split_once('?')?.1;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "page_info")
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_next_cursor() {
        let header = "<https://shop.myshopify.com/admin/api/2024-07/customers.json?page_info=abc123&limit=250>; rel=\"next\"";
        assert_eq!(next_page_info(Some(header)), Some("abc123".to_string()));
    }

    #[test]
    fn prefers_next_over_previous() {
        let header = "<https://s/x?page_info=prev1&limit=250>; rel=\"previous\", \
                      <https://s/x?page_info=next1&limit=250>; rel=\"next\"";
        assert_eq!(next_page_info(Some(header)), Some("next1".to_string()));
    }

    #[test]
    fn returns_none_without_next_rel() {
        let header = "<https://s/x?page_info=prev1>; rel=\"previous\"";
        assert_eq!(next_page_info(Some(header)), None);
        assert_eq!(next_page_info(None), None);
    }

    #[test]
    fn returns_none_when_cursor_missing_from_url() {
        let header = "<https://s/x?limit=250>; rel=\"next\"";
        assert_eq!(next_page_info(Some(header)), None);
    }
}
