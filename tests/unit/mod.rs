// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Unit tests for barbican-operator.
//!
//! These tests run without a Kubernetes cluster and exercise the public
//! API: defaulting, validation, annotation reconciliation and CRD serde.

#[path = "../common/fixtures.rs"]
mod fixtures;

use barbican_operator::config::BarbicanDefaults;

fn defaults() -> BarbicanDefaults {
    BarbicanDefaults {
        api_container_image_url: "registry/barbican-api:current".to_string(),
        worker_container_image_url: "registry/barbican-worker:current".to_string(),
        keystone_listener_container_image_url: "registry/barbican-keystone-listener:current"
            .to_string(),
        api_timeout: 90,
    }
}

mod defaulting_tests {
    use super::defaults;
    use super::fixtures::BarbicanBuilder;
    use barbican_operator::crd::BarbicanSpecCore;

    #[test]
    fn test_fills_every_unset_image() {
        let mut resource = BarbicanBuilder::new("barbican").build();
        resource.apply_defaults(&defaults());

        assert_eq!(
            resource.spec.barbican_api.container_image,
            "registry/barbican-api:current"
        );
        assert_eq!(
            resource.spec.barbican_worker.container_image,
            "registry/barbican-worker:current"
        );
        assert_eq!(
            resource.spec.barbican_keystone_listener.container_image,
            "registry/barbican-keystone-listener:current"
        );
    }

    #[test]
    fn test_keeps_user_images() {
        let mut resource = BarbicanBuilder::new("barbican")
            .api_image("custom/api:1")
            .keystone_listener_image("custom/listener:1")
            .build();
        resource.apply_defaults(&defaults());

        assert_eq!(resource.spec.barbican_api.container_image, "custom/api:1");
        assert_eq!(
            resource.spec.barbican_worker.container_image,
            "registry/barbican-worker:current"
        );
        assert_eq!(
            resource.spec.barbican_keystone_listener.container_image,
            "custom/listener:1"
        );
    }

    #[test]
    fn test_second_pass_changes_nothing() {
        let mut resource = BarbicanBuilder::new("barbican").worker_image("w:2").build();
        resource.apply_defaults(&defaults());
        let once = resource.clone();
        resource.apply_defaults(&defaults());
        assert_eq!(resource, once);
    }

    #[test]
    fn test_core_spec_timeout_and_image() {
        let mut core = BarbicanSpecCore::default();
        core.apply_defaults(&defaults());
        assert_eq!(core.api_timeout, 90);
        assert_eq!(core.barbican_api.container_image, "registry/barbican-api:current");

        let mut core = BarbicanSpecCore {
            api_timeout: 300,
            ..Default::default()
        };
        core.apply_defaults(&defaults());
        assert_eq!(core.api_timeout, 300);
    }

    #[test]
    fn test_base_fields_untouched() {
        let mut resource = BarbicanBuilder::new("barbican").build();
        let base = resource.spec.base.clone();
        resource.apply_defaults(&defaults());
        assert_eq!(resource.spec.base, base);
    }
}

mod validation_tests {
    use super::fixtures::{BarbicanBuilder, minimal_resource};
    use barbican_operator::crd::{OverrideServiceSpec, RoutedOverrideSpec, SecretStore};
    use barbican_operator::webhooks::RoutedOverrideValidator;
    use barbican_operator::webhooks::field::ErrorType;

    #[test]
    fn test_minimal_resource_valid() {
        assert!(
            minimal_resource("barbican")
                .validate_create(&RoutedOverrideValidator)
                .is_ok()
        );
    }

    #[test]
    fn test_pkcs11_store_requires_block() {
        let resource = BarbicanBuilder::new("barbican")
            .secret_stores(vec![SecretStore::SimpleCrypto, SecretStore::Pkcs11])
            .build();

        let err = resource.validate_create(&RoutedOverrideValidator).unwrap_err();
        assert_eq!(err.reason(), "Invalid");
        let fields = err.field_errors();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field, "spec.PKCS11");
        assert_eq!(fields[0].error_type, ErrorType::Required);
        assert!(err.to_string().starts_with("Barbican.barbican.openstack.org \"barbican\" is invalid"));
    }

    #[test]
    fn test_pkcs11_store_with_block() {
        let resource = BarbicanBuilder::new("barbican")
            .secret_stores(vec![SecretStore::Pkcs11])
            .pkcs11()
            .build();
        assert!(resource.validate_create(&RoutedOverrideValidator).is_ok());
    }

    #[test]
    fn test_errors_collected_in_rule_order() {
        let resource = BarbicanBuilder::new("barbican")
            .secret_stores(vec![SecretStore::Pkcs11])
            .service_override(
                "public",
                RoutedOverrideSpec {
                    spec: Some(OverrideServiceSpec {
                        type_: Some("ExternalName".to_string()),
                    }),
                    ..Default::default()
                },
            )
            .build();

        let err = resource.validate_create(&RoutedOverrideValidator).unwrap_err();
        let fields: Vec<&str> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "spec.barbicanAPI.override.service[public].spec.type",
                "spec.PKCS11"
            ]
        );
    }

    #[test]
    fn test_update_rejects_same_as_create() {
        let old = minimal_resource("barbican");
        let new = BarbicanBuilder::new("barbican")
            .secret_stores(vec![SecretStore::Pkcs11])
            .build();

        let created = new.validate_create(&RoutedOverrideValidator).unwrap_err();
        let updated = new
            .validate_update(Some(&old), &RoutedOverrideValidator)
            .unwrap_err();
        assert_eq!(created.field_errors(), updated.field_errors());
    }

    #[test]
    fn test_delete_always_allowed() {
        let resource = BarbicanBuilder::new("barbican")
            .secret_stores(vec![SecretStore::Pkcs11])
            .build();
        assert!(resource.validate_delete().is_ok());
    }
}

mod annotation_tests {
    use super::defaults;
    use barbican_operator::webhooks::annotations::{
        BARBICAN_TIMEOUT_ANNOTATION, HAPROXY_TIMEOUT_ANNOTATION, default_route_annotations,
        reconcile_route_annotations,
    };
    use std::collections::BTreeMap;

    #[test]
    fn test_seeded_default_timeout_is_not_claimed() {
        let mut annotations = default_route_annotations(&defaults());
        assert_eq!(annotations[HAPROXY_TIMEOUT_ANNOTATION], "90s");

        // The seeded timeout carries no flag, so it counts as manual
        reconcile_route_annotations(&mut annotations, 120);
        assert_eq!(annotations[HAPROXY_TIMEOUT_ANNOTATION], "90s");
        assert!(!annotations.contains_key(BARBICAN_TIMEOUT_ANNOTATION));
    }

    #[test]
    fn test_owned_timeout_lifecycle() {
        let mut annotations = BTreeMap::new();

        reconcile_route_annotations(&mut annotations, 60);
        assert_eq!(annotations[BARBICAN_TIMEOUT_ANNOTATION], "60s");

        reconcile_route_annotations(&mut annotations, 120);
        assert_eq!(annotations[HAPROXY_TIMEOUT_ANNOTATION], "120s");

        annotations.insert(HAPROXY_TIMEOUT_ANNOTATION.to_string(), "5m".to_string());
        reconcile_route_annotations(&mut annotations, 120);
        assert!(!annotations.contains_key(BARBICAN_TIMEOUT_ANNOTATION));
        assert_eq!(annotations[HAPROXY_TIMEOUT_ANNOTATION], "5m");
    }
}

mod crd_tests {
    use barbican_operator::crd::{Barbican, BarbicanSpec, SecretStore};
    use kube::CustomResourceExt;

    #[test]
    fn test_crd_identity() {
        let crd = Barbican::crd();
        assert_eq!(crd.spec.group, "barbican.openstack.org");
        assert_eq!(crd.spec.names.kind, "Barbican");
        assert_eq!(crd.spec.names.plural, "barbicans");
        assert_eq!(crd.spec.versions[0].name, "v1beta1");
    }

    #[test]
    fn test_spec_from_manifest() {
        let spec: BarbicanSpec = serde_json::from_value(serde_json::json!({
            "databaseInstance": "openstack",
            "rabbitMqClusterName": "rabbitmq",
            "enabledSecretStores": ["simple_crypto", "pkcs11"],
            "globalDefaultSecretStore": "pkcs11",
            "barbicanAPI": {
                "override": {"service": {"internal": {"spec": {"type": "LoadBalancer"}}}}
            }
        }))
        .unwrap();

        assert_eq!(spec.base.database_instance, "openstack");
        assert_eq!(
            spec.enabled_secret_stores,
            vec![SecretStore::SimpleCrypto, SecretStore::Pkcs11]
        );
        assert_eq!(spec.global_default_secret_store, Some(SecretStore::Pkcs11));
        let internal = &spec.barbican_api.override_.service["internal"];
        assert_eq!(
            internal.spec.as_ref().and_then(|s| s.type_.as_deref()),
            Some("LoadBalancer")
        );
    }
}
