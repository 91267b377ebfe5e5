use crate::config::BusinessSeed;
use crate::core::registry::RankRegistry;
use crate::utils::error::Result;
use chrono::Duration;

struct DemoKeyword {
    term: &'static str,
    /// (hours before now, position), oldest first
    history: &'static [(i64, u32)],
}

struct DemoBusiness {
    name: &'static str,
    domain: &'static str,
    keywords: &'static [DemoKeyword],
}

const DEMO_DATA: &[DemoBusiness] = &[
    DemoBusiness {
        name: "Joe's Coffee Shop",
        domain: "joescoffee.com",
        keywords: &[
            DemoKeyword {
                term: "best coffee shop",
                history: &[(24, 5), (12, 4), (6, 3), (0, 3)],
            },
            DemoKeyword {
                term: "local cafe near me",
                history: &[(24, 8), (12, 7), (0, 7)],
            },
        ],
    },
    DemoBusiness {
        name: "Smith Dental Practice",
        domain: "smithdental.com",
        keywords: &[DemoKeyword {
            term: "dentist near me",
            history: &[(24, 3), (12, 2), (0, 2)],
        }],
    },
];

/// 載入示範資料：兩個商家與它們的歷史排名
///
/// History is replayed through the normal observation path, so the
/// current/previous positions come out of the same update rule as live
/// checks. The first demo business ends up selected.
pub fn seed_demo_data(registry: &mut RankRegistry) -> Result<()> {
    let now = registry.now();
    let mut first_business: Option<String> = None;

    for demo in DEMO_DATA {
        let business_id = registry
            .add_business(demo.name, demo.domain)?
            .id()
            .to_string();

        for demo_keyword in demo.keywords {
            let keyword_id = registry
                .add_keyword(&business_id, demo_keyword.term)?
                .id()
                .to_string();
            for &(hours_ago, position) in demo_keyword.history {
                let at = now - Duration::hours(hours_ago);
                registry.record_observation_at(&keyword_id, position, at)?;
            }
        }

        first_business.get_or_insert(business_id);
    }

    if let Some(id) = first_business {
        registry.select_business(&id)?;
    }
    tracing::info!("🌱 Loaded {} demo businesses", DEMO_DATA.len());
    Ok(())
}

/// Adds the businesses and keywords declared in the config file.
pub fn seed_from_config(registry: &mut RankRegistry, seeds: &[BusinessSeed]) -> Result<usize> {
    let mut added = 0;
    for seed in seeds {
        let business_id = registry
            .add_business(&seed.name, &seed.domain)?
            .id()
            .to_string();
        for term in &seed.keywords {
            registry.add_keyword(&business_id, term)?;
        }
        added += 1;
    }
    Ok(added)
}
