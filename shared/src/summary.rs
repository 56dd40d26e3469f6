//! 基于已获取列表的统计与过滤，只用于展示

use crate::{Agent, Distribution};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AgentStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

impl AgentStats {
    pub fn from_agents(agents: &[Agent]) -> Self {
        let active = agents.iter().filter(|a| a.is_active).count();
        Self {
            total: agents.len(),
            active,
            inactive: agents.len() - active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DistributionStats {
    pub total: usize,
    pub records: u64,
    pub unique_files: usize,
    pub unique_agents: usize,
}

impl DistributionStats {
    pub fn from_distributions(distributions: &[Distribution]) -> Self {
        let files: HashSet<&str> = distributions.iter().map(|d| d.file_name.as_str()).collect();
        let agents: HashSet<&str> = distributions.iter().map(|d| d.agent_id.as_str()).collect();
        Self {
            total: distributions.len(),
            records: distributions.iter().map(|d| d.total_items).sum(),
            unique_files: files.len(),
            unique_agents: agents.len(),
        }
    }
}

/// 按文件名、代理名、代理邮箱做大小写无关的子串过滤
pub fn filter_distributions<'a>(
    distributions: &'a [Distribution],
    term: &str,
) -> Vec<&'a Distribution> {
    let needle = term.trim().to_lowercase();
    distributions
        .iter()
        .filter(|d| {
            needle.is_empty()
                || [&d.file_name, &d.agent_name, &d.agent_email]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn agent(id: &str, active: bool) -> Agent {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Agent {
            id: id.to_string(),
            name: format!("agent {id}"),
            email: format!("{id}@example.com"),
            mobile: "+1".to_string(),
            is_active: active,
            created_at: at,
            updated_at: at,
        }
    }

    fn distribution(id: &str, agent_id: &str, file: &str, items: u64) -> Distribution {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Distribution {
            id: id.to_string(),
            agent_id: agent_id.to_string(),
            agent_name: format!("Agent {agent_id}"),
            agent_email: format!("{agent_id}@corp.io"),
            items: Vec::new(),
            upload_date: at,
            file_name: file.to_string(),
            total_items: items,
            item_count: items,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn counts_active_and_inactive_agents() {
        let stats = AgentStats::from_agents(&[agent("1", true), agent("2", false), agent("3", true)]);
        assert_eq!(
            stats,
            AgentStats {
                total: 3,
                active: 2,
                inactive: 1
            }
        );
    }

    #[test]
    fn distribution_stats_dedupe_files_and_agents() {
        let list = [
            distribution("d1", "a", "leads.csv", 3),
            distribution("d2", "b", "leads.csv", 2),
            distribution("d3", "a", "more.xlsx", 4),
        ];
        let stats = DistributionStats::from_distributions(&list);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.records, 9);
        assert_eq!(stats.unique_files, 2);
        assert_eq!(stats.unique_agents, 2);
    }

    #[test]
    fn filter_matches_file_agent_name_and_email() {
        let list = [
            distribution("d1", "alice", "Leads.csv", 1),
            distribution("d2", "bob", "other.xlsx", 1),
        ];
        assert_eq!(filter_distributions(&list, "LEADS").len(), 1);
        assert_eq!(filter_distributions(&list, "agent bob")[0].id, "d2");
        assert_eq!(filter_distributions(&list, "@corp.io").len(), 2);
        assert_eq!(filter_distributions(&list, "").len(), 2);
        assert!(filter_distributions(&list, "nobody").is_empty());
    }
}
