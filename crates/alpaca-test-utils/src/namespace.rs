//! Namespace snapshot documents.
//!
//! Snapshots use the layout read by the in-memory namespace client: mappings
//! are nodes with children, scalars are payloads, `~` is an empty node, and
//! `_data` holds the payload of a node that also has children.

/// A namespace for application `svc` with `dev` and `prod` profiles, a
/// shared default layer, one datasource and one component.
///
/// The key `timeout` is defined by both the default and the `svc` layer for
/// `dev`, with different values.
pub const SAMPLE_SNAPSHOT: &str = r#"
config:
  applications:
    default:
      dev:
        timeout: "10"
        log:
          level: info
        feature-x: ~
      prod:
        timeout: "60"
    svc:
      dev:
        _data: |
          server:
            port: 8081
          tags: [a, b]
        timeout: "30"
        db:
          url: jdbc:svc-dev
  databases:
    default:
      dev:
        pool-size: "4"
    primary:
      dev:
        url: jdbc:primary-dev
        user: app
  components:
    cache:
      dev:
        ttl: "300"
"#;

/// A namespace whose application root carries a payload that is not a
/// valid YAML document.
pub const BROKEN_DOCUMENT_SNAPSHOT: &str = r#"
config:
  applications:
    svc:
      dev:
        _data: "key: [unclosed"
        timeout: "30"
"#;
