//! Route timeout annotation reconciliation.
//!
//! The operator owns the HAProxy timeout annotation on a route only while its
//! own flag annotation holds the same value. The two values encode the last
//! decision, so reconciliation needs no other state and is safe to re-run on
//! every render:
//!
//! | flag    | timeout | action                                   |
//! |---------|---------|------------------------------------------|
//! | absent  | present | leave alone (set by a human)             |
//! | present | differs | drop the flag (human edited the timeout) |
//! | other   |         | write the timeout to both keys           |

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::BarbicanDefaults;
use crate::crd::BarbicanSpecCore;

/// Route timeout read by the OpenShift HAProxy router
pub const HAPROXY_TIMEOUT_ANNOTATION: &str = "haproxy.router.openshift.io/timeout";

/// Flag marking the route timeout as set by the operator
pub const BARBICAN_TIMEOUT_ANNOTATION: &str = "api.barbican.openstack.org/timeout";

/// Canonical annotation value for a timeout in seconds
pub fn format_timeout(seconds: i32) -> String {
    format!("{}s", seconds)
}

/// Reconcile the route timeout annotations against `timeout_seconds`.
///
/// Mutates `annotations` in place; the caller persists the route afterwards.
pub fn reconcile_route_annotations(annotations: &mut BTreeMap<String, String>, timeout_seconds: i32) {
    let flag = annotations.get(BARBICAN_TIMEOUT_ANNOTATION);
    let timeout = annotations.get(HAPROXY_TIMEOUT_ANNOTATION);

    match (flag, timeout) {
        (None, Some(_)) => {
            debug!("route timeout set manually, leaving it alone");
        }
        (Some(flag), Some(timeout)) if flag != timeout => {
            debug!(
                flag = %flag,
                timeout = %timeout,
                "route timeout edited manually, releasing ownership"
            );
            annotations.remove(BARBICAN_TIMEOUT_ANNOTATION);
        }
        _ => {
            let value = format_timeout(timeout_seconds);
            annotations.insert(BARBICAN_TIMEOUT_ANNOTATION.to_string(), value.clone());
            annotations.insert(HAPROXY_TIMEOUT_ANNOTATION.to_string(), value);
        }
    }
}

/// Route annotations for a route rendered before any spec timeout is known.
pub fn default_route_annotations(defaults: &BarbicanDefaults) -> BTreeMap<String, String> {
    BTreeMap::from([(
        HAPROXY_TIMEOUT_ANNOTATION.to_string(),
        format_timeout(defaults.api_timeout),
    )])
}

impl BarbicanSpecCore {
    /// Reconcile route annotations against this spec's API timeout.
    pub fn set_default_route_annotations(&self, annotations: &mut BTreeMap<String, String>) {
        reconcile_route_annotations(annotations, self.api_timeout);
    }
}
