//! 인스턴스 그룹핑
//!
//! `<root>.<instance>.<role>` 형태의 섹션들을 인스턴스 이름별로 묶고,
//! primary 레코드가 항상 맨 앞에 오도록 정렬합니다.
//!
//! ```text
//! database.orders.replica1  ─┐
//! database.orders.master    ─┼─▶ orders: [master, replica1, replica2]
//! database.orders.replica2  ─┘
//! database.billing          ───▶ billing: [billing]   (단일 레코드, 암묵적 primary)
//! ```

use crate::core::errors::{AppError, AppResult};

/// primary 역할을 나타내는 섹션 접미사
pub const PRIMARY_ROLE: &str = "master";

/// 레코드 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// 쓰기 대상, 풀 설정의 기준
    Primary,
    /// 읽기 전용 복제본
    Replica,
}

/// 인스턴스 그룹의 구성원 하나
#[derive(Debug, Clone)]
pub struct Member<R> {
    /// 원본 섹션 이름 (`database.orders.master`)
    pub section: String,
    pub role: Role,
    pub record: R,
}

/// 인스턴스 이름과 정렬된 레코드 목록
///
/// 불변식:
/// - 항상 하나 이상의 구성원을 가짐
/// - 첫 번째 구성원이 primary
/// - 나머지는 발견 순서를 유지
#[derive(Debug, Clone)]
pub struct InstanceGroup<R> {
    name: String,
    members: Vec<Member<R>>,
}

impl<R> InstanceGroup<R> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primary(&self) -> &Member<R> {
        &self.members[0]
    }

    pub fn replicas(&self) -> &[Member<R>] {
        &self.members[1..]
    }

    pub fn members(&self) -> &[Member<R>] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// primary 레코드와 replica 레코드 목록으로 분해합니다.
    pub fn into_parts(self) -> (R, Vec<R>) {
        let mut records = self.members.into_iter().map(|m| m.record);
        // 그룹은 구성원 없이 만들어지지 않음
        let primary = records.next();
        match primary {
            Some(primary) => (primary, records.collect()),
            None => unreachable!("instance group without members"),
        }
    }
}

/// 루트 접두사를 제거한 섹션 이름을 인스턴스 이름과 역할로 나눕니다.
///
/// 첫 번째 `.`에서 분리하며, 구분자가 없으면 이름 전체가 인스턴스 이름이고
/// 암묵적으로 primary 입니다.
///
/// ```rust,ignore
/// assert_eq!(split_instance_name("orders.master")?, ("orders", Role::Primary));
/// assert_eq!(split_instance_name("orders.replica1")?, ("orders", Role::Replica));
/// assert_eq!(split_instance_name("sessions")?, ("sessions", Role::Primary));
/// ```
pub fn split_instance_name(suffix: &str) -> AppResult<(&str, Role)> {
    let (instance, role) = match suffix.split_once('.') {
        Some((instance, role)) => {
            if role.is_empty() {
                return Err(AppError::ValidationError(format!(
                    "section role is empty: {}",
                    suffix
                )));
            }
            let role = if role == PRIMARY_ROLE {
                Role::Primary
            } else {
                Role::Replica
            };
            (instance, role)
        }
        None => (suffix, Role::Primary),
    };

    if instance.is_empty() {
        return Err(AppError::ValidationError(format!(
            "instance name is empty: {}",
            suffix
        )));
    }
    Ok((instance, role))
}

/// 섹션 이름과 레코드 목록을 인스턴스 그룹으로 묶습니다.
///
/// - 그룹 순서는 인스턴스가 처음 발견된 순서
/// - 그룹 안에서는 primary가 맨 앞, 나머지는 발견 순서 유지 (안정 정렬)
/// - 단일 레코드 그룹은 접미사와 관계없이 primary
/// - 명시적 `master`가 둘 이상이면 `MultiplePrimaries`
pub fn group_instances<R>(records: Vec<(String, R)>) -> AppResult<Vec<InstanceGroup<R>>> {
    let mut groups: Vec<InstanceGroup<R>> = Vec::new();

    for (suffix, record) in records {
        let (instance, role) = split_instance_name(&suffix)?;
        let member = Member {
            section: suffix.clone(),
            role,
            record,
        };

        match groups.iter_mut().find(|g| g.name == instance) {
            Some(group) => group.members.push(member),
            None => groups.push(InstanceGroup {
                name: instance.to_string(),
                members: vec![member],
            }),
        }
    }

    for group in groups.iter_mut() {
        let primaries = group
            .members
            .iter()
            .filter(|m| m.role == Role::Primary)
            .count();
        if primaries > 1 {
            return Err(AppError::MultiplePrimaries {
                instance: group.name.clone(),
                count: primaries,
            });
        }

        group.members.sort_by_key(|m| m.role != Role::Primary);
        // master가 없으면 첫 번째 레코드가 primary 역할을 맡음
        group.members[0].role = Role::Primary;
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(names: &[&str]) -> Vec<(String, String)> {
        names
            .iter()
            .map(|n| (n.to_string(), n.to_string()))
            .collect()
    }

    #[test]
    fn test_split_instance_name() {
        assert_eq!(split_instance_name("orders.master").unwrap(), ("orders", Role::Primary));
        assert_eq!(split_instance_name("orders.replica1").unwrap(), ("orders", Role::Replica));
        assert_eq!(split_instance_name("sessions").unwrap(), ("sessions", Role::Primary));
        // 첫 번째 점에서만 분리
        assert_eq!(split_instance_name("orders.read.1").unwrap(), ("orders", Role::Replica));
    }

    #[test]
    fn test_split_rejects_empty_parts() {
        assert!(matches!(split_instance_name(".master"), Err(AppError::ValidationError(_))));
        assert!(matches!(split_instance_name("orders."), Err(AppError::ValidationError(_))));
        assert!(matches!(split_instance_name(""), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_single_record_is_primary_regardless_of_suffix() {
        let groups = group_instances(records(&["orders.replica1"])).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].primary().role, Role::Primary);
        assert!(groups[0].replicas().is_empty());
    }

    #[test]
    fn test_master_sorts_first_and_replicas_keep_order() {
        let groups = group_instances(records(&[
            "orders.replica2",
            "orders.replica1",
            "orders.master",
            "orders.replica3",
        ]))
        .unwrap();

        let (primary, replicas) = groups.into_iter().next().unwrap().into_parts();
        assert_eq!(primary, "orders.master");
        assert_eq!(replicas, vec!["orders.replica2", "orders.replica1", "orders.replica3"]);
    }

    #[test]
    fn test_groups_keep_first_discovery_order() {
        let groups = group_instances(records(&[
            "billing.replica1",
            "orders.master",
            "billing.master",
            "audit",
        ]))
        .unwrap();

        let names: Vec<&str> = groups.iter().map(|g| g.name()).collect();
        assert_eq!(names, vec!["billing", "orders", "audit"]);
        assert_eq!(groups[0].primary().section, "billing.master");
    }

    #[test]
    fn test_multiple_primaries_rejected() {
        let result = group_instances(vec![
            ("orders.master".to_string(), 1),
            ("orders.master".to_string(), 2),
        ]);

        match result {
            Err(AppError::MultiplePrimaries { instance, count }) => {
                assert_eq!(instance, "orders");
                assert_eq!(count, 2);
            }
            _ => panic!("Expected MultiplePrimaries"),
        }
    }

    #[test]
    fn test_group_without_master_uses_first_record() {
        let groups = group_instances(records(&["orders.a", "orders.b"])).unwrap();
        assert_eq!(groups[0].primary().section, "orders.a");
        assert_eq!(groups[0].primary().role, Role::Primary);
        assert_eq!(groups[0].replicas()[0].role, Role::Replica);
        assert_eq!(groups[0].len(), 2);
    }
}
