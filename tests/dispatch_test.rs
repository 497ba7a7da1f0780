//! End-to-end dispatch tests for the create step against a fake service API.

use std::sync::{Arc, Mutex};

use kube_service_step::{
    callable_schema, ApiError, CallableSchema, Connection, DispatchError, Service, ServiceApi,
    ValidationErrorKind, GENERATED_NAME_PREFIX,
};
use serde_json::json;

/// Records every create call and returns a canned result.
struct FakeApi {
    result: Result<String, ApiError>,
    calls: Mutex<Vec<(Connection, Service)>>,
}

impl FakeApi {
    fn returning(result: Result<String, ApiError>) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ServiceApi for FakeApi {
    fn create_service(
        &self,
        connection: &Connection,
        service: &Service,
    ) -> Result<String, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push((connection.clone(), service.clone()));
        self.result.clone()
    }
}

fn schema_with(api: Arc<FakeApi>) -> CallableSchema {
    callable_schema(api).unwrap()
}

mod scenarios {
    use super::*;

    #[test]
    fn create_without_name_gets_generated_name_prefix() {
        let api = FakeApi::returning(Ok("kube-service-step-x7f2k".to_string()));
        let schema = schema_with(api.clone());

        let input = json!({
            "connection": {"host": "kubernetes.default.svc"},
            "service": {"spec": {"ports": [{"port": 80, "protocol": "TCP"}]}}
        });
        let (variant, _) = schema.dispatch("create", &input).unwrap();

        assert_eq!(variant, "success");
        assert!(!schema
            .get("create")
            .unwrap()
            .get_output(&variant)
            .unwrap()
            .is_error());

        let calls = api.calls.lock().unwrap();
        let (connection, service) = &calls[0];
        assert_eq!(service.metadata.generate_name, GENERATED_NAME_PREFIX);
        assert_eq!(connection.host, "kubernetes.default.svc");
        // Connection defaults flowed through normalization into the client.
        assert_eq!(connection.path, "/api");
        assert_eq!(connection.qps, 5.0);
        assert_eq!(connection.burst, 10);
    }

    #[test]
    fn missing_service_rejected_before_handler_runs() {
        let api = FakeApi::returning(Ok("unused".to_string()));
        let schema = schema_with(api.clone());

        let err = schema
            .dispatch("create", &json!({"connection": {}}))
            .unwrap_err();
        match err {
            DispatchError::InvalidInput { step, source } => {
                assert_eq!(step, "create");
                assert_eq!(source.path, "/service");
                assert!(matches!(source.kind, ValidationErrorKind::MissingField));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(api.call_count(), 0);
    }

    #[test]
    fn cacert_without_cert_rejected_with_dependency_error() {
        let api = FakeApi::returning(Ok("unused".to_string()));
        let schema = schema_with(api.clone());

        let cacert = "-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----";
        let err = schema
            .dispatch(
                "create",
                &json!({"connection": {"cacert": cacert}, "service": {}}),
            )
            .unwrap_err();
        match err {
            DispatchError::InvalidInput { source, .. } => {
                assert_eq!(source.path, "/connection/cacert");
                assert!(
                    matches!(source.kind, ValidationErrorKind::Dependency { ref missing } if missing == "cert")
                );
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(api.call_count(), 0);
    }

    #[test]
    fn successful_create_returns_success_variant_with_name() {
        let api = FakeApi::returning(Ok("svc-123".to_string()));
        let schema = schema_with(api);

        let (variant, output) = schema
            .dispatch(
                "create",
                &json!({
                    "connection": {},
                    "service": {"metadata": {"name": "svc-123"}}
                }),
            )
            .unwrap();
        assert_eq!(variant, "success");
        assert_eq!(output, json!({"name": "svc-123"}));
    }

    #[test]
    fn failed_create_returns_error_variant() {
        let api = FakeApi::returning(Err(ApiError("connection refused".to_string())));
        let schema = schema_with(api);

        let (variant, output) = schema
            .dispatch("create", &json!({"connection": {}, "service": {}}))
            .unwrap();
        assert_eq!(variant, "error");
        assert_eq!(
            output,
            json!({"error": "failed to create service (connection refused)"})
        );
        assert!(schema
            .get("create")
            .unwrap()
            .get_output(&variant)
            .unwrap()
            .is_error());
    }
}

mod validation {
    use super::*;

    #[test]
    fn unknown_step_rejected() {
        let schema = schema_with(FakeApi::returning(Ok("unused".to_string())));
        let err = schema.dispatch("delete", &json!({})).unwrap_err();
        assert!(matches!(err, DispatchError::UnknownStep { name } if name == "delete"));
    }

    #[test]
    fn unknown_field_rejected() {
        let schema = schema_with(FakeApi::returning(Ok("unused".to_string())));
        let err = schema
            .dispatch(
                "create",
                &json!({"connection": {}, "service": {}, "replicas": 3}),
            )
            .unwrap_err();
        match err {
            DispatchError::InvalidInput { source, .. } => {
                assert_eq!(source.path, "/replicas");
                assert!(matches!(source.kind, ValidationErrorKind::UnknownField));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn name_and_generate_name_conflict() {
        let schema = schema_with(FakeApi::returning(Ok("unused".to_string())));
        let err = schema
            .dispatch(
                "create",
                &json!({
                    "connection": {},
                    "service": {"metadata": {"name": "a", "generateName": "a-"}}
                }),
            )
            .unwrap_err();
        match err {
            DispatchError::InvalidInput { source, .. } => {
                assert_eq!(source.path, "/service/metadata/name");
                assert!(
                    matches!(source.kind, ValidationErrorKind::Conflict { ref other } if other == "generateName")
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_metadata_name_equivalent_to_omitting_it() {
        let api = FakeApi::returning(Ok("svc".to_string()));
        let schema = schema_with(api.clone());

        // An empty name is treated as absent, so the generated-name prefix
        // applies exactly as if the field were never supplied.
        schema
            .dispatch(
                "create",
                &json!({"connection": {}, "service": {"metadata": {"name": ""}}}),
            )
            .unwrap();

        let calls = api.calls.lock().unwrap();
        let (_, service) = &calls[0];
        assert!(service.metadata.name.is_empty());
        assert_eq!(service.metadata.generate_name, GENERATED_NAME_PREFIX);
    }
}

mod introspection {
    use super::*;

    #[test]
    fn describe_exposes_create_step() {
        let schema = schema_with(FakeApi::returning(Ok("unused".to_string())));
        let described = schema.describe();

        let create = &described["steps"]["create"];
        assert_eq!(create["input"]["root"], "input");
        assert!(create["input"]["objects"]["Connection"].is_object());
        assert!(create["input"]["objects"]["Service"].is_object());
        assert!(create["input"]["objects"]["ObjectMeta"].is_object());
        assert_eq!(create["outputs"]["success"]["error"], false);
        assert_eq!(create["outputs"]["error"]["error"], true);
        assert_eq!(create["display"]["name"], "Create service");
    }

    #[test]
    fn input_schema_marks_required_fields() {
        let schema = schema_with(FakeApi::returning(Ok("unused".to_string())));
        let described = schema.describe();
        let input = &described["steps"]["create"]["input"]["objects"]["input"];
        assert_eq!(input["properties"]["connection"]["required"], true);
        assert_eq!(input["properties"]["service"]["required"], true);
    }
}
