//! HTML-mode element knowledge
//!
//! Void elements, raw-text elements, and the fixed set of implicit-close
//! rules used to repair tag soup such as `<li>a<li>b` or `<td>1<td>2`.
//! All name comparisons here ignore ASCII case.

use crate::dom::element::Element;
use crate::dom::namespace::ns;
use crate::dom::strings::StringPool;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// A new element named in `targets` may not open while an element named in
/// `triggers` is open, unless an element named in `barriers` sits between
struct ImplicitClose {
    targets: &'static [&'static str],
    triggers: &'static [&'static str],
    barriers: &'static [&'static str],
}

const TABLE_SECTIONS: &[&str] = &["thead", "tbody", "tfoot"];

const IMPLICIT_CLOSE: &[ImplicitClose] = &[
    ImplicitClose { targets: &["dd", "dt"], triggers: &["dd", "dt"], barriers: &["dl"] },
    ImplicitClose { targets: &["tr"], triggers: &["tr"], barriers: &["table"] },
    ImplicitClose { targets: &["td"], triggers: &["td"], barriers: &["table"] },
    ImplicitClose { targets: TABLE_SECTIONS, triggers: TABLE_SECTIONS, barriers: &["table"] },
    ImplicitClose { targets: &["li"], triggers: &["li"], barriers: &["ul", "ol", "menu"] },
    ImplicitClose { targets: &["param"], triggers: &["param"], barriers: &["object"] },
    ImplicitClose {
        targets: &["source"],
        triggers: &["source"],
        barriers: &["audio", "video", "picture"],
    },
    ImplicitClose { targets: &["body"], triggers: &["head"], barriers: &[] },
    ImplicitClose { targets: &["style"], triggers: &["style"], barriers: &[] },
];

#[inline]
fn listed(names: &[&str], name: &str) -> bool {
    names.iter().any(|n| n.eq_ignore_ascii_case(name))
}

/// Elements in no namespace or the XHTML namespace count as HTML
#[inline]
fn is_html_namespace(namespace: Option<&str>) -> bool {
    matches!(namespace, None | Some(ns::XHTML))
}

pub fn is_void_element(local_name: &str, namespace: Option<&str>) -> bool {
    is_html_namespace(namespace) && listed(VOID_ELEMENTS, local_name)
}

pub fn is_raw_text_element(local_name: &str, namespace: Option<&str>) -> bool {
    is_html_namespace(namespace) && listed(RAW_TEXT_ELEMENTS, local_name)
}

/// Whether an element named `local_name` may open given the open elements
/// (innermost last). False means the innermost element must close first.
pub fn can_element_be_here(open: &[Element], strings: &StringPool, local_name: &str) -> bool {
    for rule in IMPLICIT_CLOSE.iter().filter(|r| listed(r.targets, local_name)) {
        for ancestor in open.iter().rev() {
            let ancestor_name = strings.get(ancestor.local_name);
            if listed(rule.barriers, ancestor_name) {
                break;
            }
            if listed(rule.triggers, ancestor_name) {
                return false;
            }
        }
    }
    true
}
