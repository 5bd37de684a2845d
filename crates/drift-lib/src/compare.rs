//! Structural comparison of two namespace snapshots
//!
//! Every category is always evaluated and all differences are collected, so a
//! single run shows the full drift picture. Categories are visited in the fixed
//! order of [`Category::ALL`]; within a category, differences follow element
//! order. The comparison never fails: structural mismatch is report content.

use crate::models::{Autoscaler, ConfigMap, Deployment, IngressRule, Service, Snapshot};
use crate::report::{Category, DiffKind, DiffReport, DiffValue, Difference};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Compare `a` (expected) against `b` (actual)
pub fn compare(a: &Snapshot, b: &Snapshot) -> DiffReport {
    let mut diffs = Diffs::default();

    diffs.field(Category::Pods, || "pods".to_string(), a.pod_count, b.pod_count);
    deployments(&mut diffs, &a.deployments, &b.deployments);
    autoscalers(
        &mut diffs,
        &a.horizontal_autoscalers,
        &b.horizontal_autoscalers,
    );
    services(&mut diffs, &a.services, &b.services);
    config_maps(&mut diffs, &a.config_maps, &b.config_maps);
    ingress_rules(&mut diffs, &a.ingress_rules, &b.ingress_rules);
    diffs.field(
        Category::CredentialSecret,
        || "credentialSecret".to_string(),
        a.has_credential_secret,
        b.has_credential_secret,
    );

    DiffReport::new(diffs.out)
}

#[derive(Default)]
struct Diffs {
    out: Vec<Difference>,
}

impl Diffs {
    fn push(
        &mut self,
        category: Category,
        path: String,
        kind: DiffKind,
        expected: DiffValue,
        actual: DiffValue,
    ) {
        self.out.push(Difference {
            category,
            path,
            kind,
            expected,
            actual,
        });
    }

    /// Scalar equality; the path is only rendered on mismatch
    fn field<T>(&mut self, category: Category, path: impl FnOnce() -> String, a: T, b: T)
    where
        T: PartialEq + Into<DiffValue>,
    {
        if a != b {
            self.push(category, path(), DiffKind::Changed, a.into(), b.into());
        }
    }

    /// Record a count mismatch if any and return the positionally aligned pairs
    fn aligned<'a, T>(
        &mut self,
        category: Category,
        path: &str,
        a: &'a [T],
        b: &'a [T],
    ) -> impl Iterator<Item = (usize, &'a T, &'a T)> {
        if a.len() != b.len() {
            self.push(
                category,
                path.to_string(),
                DiffKind::CountMismatch,
                a.len().into(),
                b.len().into(),
            );
        }
        a.iter().zip(b.iter()).enumerate().map(|(i, (x, y))| (i, x, y))
    }
}

fn deployments(diffs: &mut Diffs, a: &[Deployment], b: &[Deployment]) {
    let cat = Category::Deployments;

    for (i, x, y) in diffs.aligned(cat, "deployments", a, b) {
        diffs.field(
            cat,
            || format!("deployments[{i}].replicas"),
            x.replicas,
            y.replicas,
        );

        let containers = format!("deployments[{i}].containers");
        for (j, cx, cy) in diffs.aligned(cat, &containers, &x.containers, &y.containers) {
            let fields = [
                ("requestCpu", &cx.request_cpu, &cy.request_cpu),
                ("requestMemory", &cx.request_memory, &cy.request_memory),
                ("limitCpu", &cx.limit_cpu, &cy.limit_cpu),
                ("limitMemory", &cx.limit_memory, &cy.limit_memory),
            ];
            for (name, qa, qb) in fields {
                diffs.field(
                    cat,
                    || format!("{containers}[{j}].{name}"),
                    qa.as_str(),
                    qb.as_str(),
                );
            }
        }
    }
}

fn autoscalers(diffs: &mut Diffs, a: &[Autoscaler], b: &[Autoscaler]) {
    let cat = Category::Autoscalers;

    for (i, x, y) in diffs.aligned(cat, "autoscalers", a, b) {
        diffs.field(
            cat,
            || format!("autoscalers[{i}].minReplicas"),
            x.min_replicas,
            y.min_replicas,
        );
        diffs.field(
            cat,
            || format!("autoscalers[{i}].maxReplicas"),
            x.max_replicas,
            y.max_replicas,
        );
        diffs.field(
            cat,
            || format!("autoscalers[{i}].targetCpuUtilizationPercent"),
            x.target_cpu_utilization_percent,
            y.target_cpu_utilization_percent,
        );
    }
}

fn services(diffs: &mut Diffs, a: &[Service], b: &[Service]) {
    let cat = Category::Services;

    for (i, x, y) in diffs.aligned(cat, "services", a, b) {
        let path = format!("services[{i}].ports");
        for port in x.ports.difference(&y.ports) {
            diffs.push(
                cat,
                path.clone(),
                DiffKind::Removed,
                port.to_string().into(),
                DiffValue::Absent,
            );
        }
        for port in y.ports.difference(&x.ports) {
            diffs.push(
                cat,
                path.clone(),
                DiffKind::Added,
                DiffValue::Absent,
                port.to_string().into(),
            );
        }
    }
}

fn config_maps(diffs: &mut Diffs, a: &[ConfigMap], b: &[ConfigMap]) {
    let cat = Category::ConfigMaps;

    if !(uniquely_named(a) && uniquely_named(b)) {
        for (i, x, y) in diffs.aligned(cat, "configmaps", a, b) {
            diffs.field(
                cat,
                || format!("configmaps[{i}].name"),
                x.name.as_str(),
                y.name.as_str(),
            );
            data(diffs, &format!("configmaps[{i}]"), &x.data, &y.data);
        }
        return;
    }

    if a.len() != b.len() {
        diffs.push(
            cat,
            "configmaps".to_string(),
            DiffKind::CountMismatch,
            a.len().into(),
            b.len().into(),
        );
    }

    let by_name: BTreeMap<&str, &ConfigMap> = b.iter().map(|cm| (cm.name.as_str(), cm)).collect();
    for x in a {
        let path = format!("configmaps[{}]", x.name);
        match by_name.get(x.name.as_str()) {
            Some(y) => data(diffs, &path, &x.data, &y.data),
            None => diffs.push(
                cat,
                path,
                DiffKind::Removed,
                x.name.as_str().into(),
                DiffValue::Absent,
            ),
        }
    }

    let in_a: HashSet<&str> = a.iter().map(|cm| cm.name.as_str()).collect();
    for y in b.iter().filter(|cm| !in_a.contains(cm.name.as_str())) {
        diffs.push(
            cat,
            format!("configmaps[{}]", y.name),
            DiffKind::Added,
            DiffValue::Absent,
            y.name.as_str().into(),
        );
    }
}

/// Name matching applies only when every config map has a distinct, non-empty name
fn uniquely_named(maps: &[ConfigMap]) -> bool {
    let mut seen = HashSet::with_capacity(maps.len());
    maps.iter()
        .all(|cm| !cm.name.is_empty() && seen.insert(cm.name.as_str()))
}

fn data(
    diffs: &mut Diffs,
    prefix: &str,
    a: &BTreeMap<String, String>,
    b: &BTreeMap<String, String>,
) {
    let cat = Category::ConfigMaps;
    let keys: BTreeSet<&String> = a.keys().chain(b.keys()).collect();

    for key in keys {
        let path = || format!("{prefix}.data.{key}");
        match (a.get(key), b.get(key)) {
            (Some(x), Some(y)) => diffs.field(cat, path, x.as_str(), y.as_str()),
            (Some(x), None) => diffs.push(
                cat,
                path(),
                DiffKind::Removed,
                x.as_str().into(),
                DiffValue::Absent,
            ),
            (None, Some(y)) => diffs.push(
                cat,
                path(),
                DiffKind::Added,
                DiffValue::Absent,
                y.as_str().into(),
            ),
            (None, None) => {}
        }
    }
}

fn ingress_rules(diffs: &mut Diffs, a: &[IngressRule], b: &[IngressRule]) {
    let cat = Category::Ingress;

    for (i, x, y) in diffs.aligned(cat, "ingress", a, b) {
        if x != y {
            diffs.push(
                cat,
                format!("ingress[{i}]"),
                DiffKind::Changed,
                x.to_string().into(),
                y.to_string().into(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContainerResources, PortBinding};

    fn container(cpu: &str) -> ContainerResources {
        ContainerResources {
            request_cpu: cpu.to_string(),
            request_memory: "128Mi".to_string(),
            limit_cpu: "500m".to_string(),
            limit_memory: "256Mi".to_string(),
        }
    }

    fn deployment(replicas: i32, cpus: &[&str]) -> Deployment {
        Deployment {
            replicas,
            containers: cpus.iter().map(|c| container(c)).collect(),
        }
    }

    fn port(name: &str, port: i32, target: &str) -> PortBinding {
        PortBinding {
            name: name.to_string(),
            port,
            protocol: "TCP".to_string(),
            target_port: target.to_string(),
        }
    }

    fn config_map(name: &str, data: &[(&str, &str)]) -> ConfigMap {
        ConfigMap {
            name: name.to_string(),
            data: data
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn ingress(service: &str, port: &str) -> IngressRule {
        IngressRule {
            service_name: service.to_string(),
            service_port: port.to_string(),
        }
    }

    /// A namespace with something in every category
    fn populated() -> Snapshot {
        Snapshot {
            pod_count: 6,
            deployments: vec![deployment(2, &["100m", "50m"]), deployment(1, &["1"])],
            horizontal_autoscalers: vec![Autoscaler {
                min_replicas: 2,
                max_replicas: 10,
                target_cpu_utilization_percent: 75,
            }],
            services: vec![Service {
                ports: [port("http", 80, "8080"), port("metrics", 9090, "9090")]
                    .into_iter()
                    .collect(),
            }],
            config_maps: vec![
                config_map("app-config", &[("replicas", "3"), ("timeout", "30")]),
                config_map("feature-flags", &[("beta", "false")]),
            ],
            ingress_rules: vec![ingress("web", "80"), ingress("api", "http")],
            has_credential_secret: true,
        }
    }

    fn paths(report: &DiffReport) -> Vec<&str> {
        report.differences.iter().map(|d| d.path.as_str()).collect()
    }

    #[test]
    fn test_reflexive() {
        for snapshot in [Snapshot::default(), populated()] {
            let report = compare(&snapshot, &snapshot);
            assert!(report.identical);
            assert!(report.differences.is_empty());
        }
    }

    #[test]
    fn test_detection_is_symmetric() {
        let a = populated();
        let mut b = populated();
        b.deployments[1].containers.push(container("200m"));
        b.config_maps[0].data.remove("timeout");
        b.ingress_rules.pop();

        let ab = compare(&a, &b);
        let ba = compare(&b, &a);
        assert_eq!(ab.identical, ba.identical);
        assert_eq!(ab.differences.len(), ba.differences.len());

        let forward = &ab.differences[0];
        let backward = &ba.differences[0];
        assert_eq!(forward.path, backward.path);
        assert_eq!(forward.expected, backward.actual);
        assert_eq!(forward.actual, backward.expected);
    }

    #[test]
    fn test_pod_count_only() {
        let a = Snapshot {
            pod_count: 4,
            deployments: vec![deployment(2, &["100m"])],
            ..Default::default()
        };
        let b = Snapshot {
            pod_count: 5,
            ..a.clone()
        };

        let report = compare(&a, &b);
        assert!(!report.identical);
        assert_eq!(
            report.differences,
            vec![Difference {
                category: Category::Pods,
                path: "pods".to_string(),
                kind: DiffKind::Changed,
                expected: DiffValue::Int(4),
                actual: DiffValue::Int(5),
            }]
        );
    }

    #[test]
    fn test_deployment_count_mismatch_compares_aligned_prefix_only() {
        let a = Snapshot {
            deployments: vec![deployment(2, &["100m"]), deployment(1, &["50m"])],
            ..Default::default()
        };
        let b = Snapshot {
            deployments: vec![
                deployment(3, &["100m"]),
                deployment(1, &["50m"]),
                deployment(7, &["2"]),
            ],
            ..Default::default()
        };

        let report = compare(&a, &b);
        let counts: Vec<_> = report
            .differences
            .iter()
            .filter(|d| d.kind == DiffKind::CountMismatch)
            .collect();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].path, "deployments");
        assert_eq!(counts[0].expected, DiffValue::Int(2));
        assert_eq!(counts[0].actual, DiffValue::Int(3));

        assert_eq!(
            paths(&report),
            vec!["deployments", "deployments[0].replicas"]
        );
    }

    #[test]
    fn test_container_fields_reported_individually() {
        let a = Snapshot {
            deployments: vec![deployment(2, &["100m", "50m"])],
            ..Default::default()
        };
        let mut b = a.clone();
        b.deployments[0].containers[1].request_cpu = "75m".to_string();
        b.deployments[0].containers[1].limit_memory = "512Mi".to_string();

        let report = compare(&a, &b);
        assert_eq!(
            paths(&report),
            vec![
                "deployments[0].containers[1].requestCpu",
                "deployments[0].containers[1].limitMemory",
            ]
        );
        assert_eq!(report.differences[0].expected, DiffValue::from("50m"));
        assert_eq!(report.differences[0].actual, DiffValue::from("75m"));
    }

    #[test]
    fn test_container_count_mismatch() {
        let a = Snapshot {
            deployments: vec![deployment(2, &["100m"])],
            ..Default::default()
        };
        let b = Snapshot {
            deployments: vec![deployment(2, &["200m", "10m"])],
            ..Default::default()
        };

        let report = compare(&a, &b);
        assert_eq!(
            paths(&report),
            vec![
                "deployments[0].containers",
                "deployments[0].containers[0].requestCpu",
            ]
        );
    }

    #[test]
    fn test_quantities_compare_literally() {
        let a = Snapshot {
            deployments: vec![deployment(1, &["1"])],
            ..Default::default()
        };
        let b = Snapshot {
            deployments: vec![deployment(1, &["1000m"])],
            ..Default::default()
        };

        assert!(!compare(&a, &b).identical);
    }

    #[test]
    fn test_autoscaler_fields() {
        let mut a = populated();
        a.horizontal_autoscalers[0].target_cpu_utilization_percent = 50;
        let mut b = populated();
        b.horizontal_autoscalers[0].max_replicas = 20;

        let report = compare(&a, &b);
        assert_eq!(
            paths(&report),
            vec![
                "autoscalers[0].maxReplicas",
                "autoscalers[0].targetCpuUtilizationPercent",
            ]
        );
    }

    #[test]
    fn test_service_ports_are_unordered() {
        let http = port("http", 80, "8080");
        let metrics = port("metrics", 9090, "9090");
        let a = Snapshot {
            services: vec![Service {
                ports: vec![http.clone(), metrics.clone()].into_iter().collect(),
            }],
            ..Default::default()
        };
        let b = Snapshot {
            services: vec![Service {
                ports: vec![metrics, http].into_iter().collect(),
            }],
            ..Default::default()
        };

        assert!(compare(&a, &b).identical);
    }

    #[test]
    fn test_service_port_added_and_removed() {
        let a = Snapshot {
            services: vec![Service {
                ports: [port("http", 80, "8080")].into_iter().collect(),
            }],
            ..Default::default()
        };
        let b = Snapshot {
            services: vec![Service {
                ports: [port("http", 80, "8081")].into_iter().collect(),
            }],
            ..Default::default()
        };

        let report = compare(&a, &b);
        assert_eq!(report.differences.len(), 2);
        assert_eq!(report.differences[0].kind, DiffKind::Removed);
        assert_eq!(report.differences[0].expected, DiffValue::from("http:80/TCP->8080"));
        assert_eq!(report.differences[1].kind, DiffKind::Added);
        assert_eq!(report.differences[1].actual, DiffValue::from("http:80/TCP->8081"));
        assert!(report.differences.iter().all(|d| d.path == "services[0].ports"));
    }

    #[test]
    fn test_config_map_key_diff() {
        let a = Snapshot {
            config_maps: vec![config_map("app", &[("replicas", "3")])],
            ..Default::default()
        };
        let b = Snapshot {
            config_maps: vec![config_map("app", &[("replicas", "5"), ("timeout", "30")])],
            ..Default::default()
        };

        let report = compare(&a, &b);
        assert_eq!(
            report.differences,
            vec![
                Difference {
                    category: Category::ConfigMaps,
                    path: "configmaps[app].data.replicas".to_string(),
                    kind: DiffKind::Changed,
                    expected: "3".into(),
                    actual: "5".into(),
                },
                Difference {
                    category: Category::ConfigMaps,
                    path: "configmaps[app].data.timeout".to_string(),
                    kind: DiffKind::Added,
                    expected: DiffValue::Absent,
                    actual: "30".into(),
                },
            ]
        );
    }

    #[test]
    fn test_config_maps_matched_by_name_ignore_reordering() {
        let a = populated();
        let mut b = populated();
        b.config_maps.reverse();

        assert!(compare(&a, &b).identical);
    }

    #[test]
    fn test_config_map_missing_by_name() {
        let a = populated();
        let mut b = populated();
        b.config_maps.remove(0);
        b.config_maps.push(config_map("extra", &[]));
        b.config_maps.push(config_map("app-config", &[("replicas", "3"), ("timeout", "30")]));

        let report = compare(&a, &b);
        assert_eq!(
            paths(&report),
            vec!["configmaps", "configmaps[extra]"]
        );
        assert_eq!(report.differences[1].kind, DiffKind::Added);
    }

    #[test]
    fn test_config_maps_fall_back_to_position_on_name_collision() {
        let a = Snapshot {
            config_maps: vec![config_map("dup", &[("k", "1")]), config_map("dup", &[("k", "2")])],
            ..Default::default()
        };
        let b = Snapshot {
            config_maps: vec![config_map("dup", &[("k", "2")]), config_map("other", &[("k", "2")])],
            ..Default::default()
        };

        let report = compare(&a, &b);
        assert_eq!(
            paths(&report),
            vec!["configmaps[0].data.k", "configmaps[1].name"]
        );
    }

    #[test]
    fn test_ingress_positional() {
        let a = populated();
        let mut b = populated();
        b.ingress_rules.swap(0, 1);

        let report = compare(&a, &b);
        assert_eq!(paths(&report), vec!["ingress[0]", "ingress[1]"]);
        assert_eq!(report.differences[0].expected, DiffValue::from("web:80"));
        assert_eq!(report.differences[0].actual, DiffValue::from("api:http"));
    }

    #[test]
    fn test_all_categories_reported_in_fixed_order() {
        let a = populated();
        let b = Snapshot {
            pod_count: 1,
            has_credential_secret: false,
            ..Default::default()
        };

        let report = compare(&a, &b);
        let categories: Vec<Category> = report.summary().into_iter().map(|(c, _)| c).collect();
        assert_eq!(categories, Category::ALL.to_vec());
        assert_eq!(report.differences.last().map(|d| d.path.as_str()), Some("credentialSecret"));
    }
}
