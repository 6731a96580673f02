//! Property tests for the ranking engine.

use proptest::prelude::*;

use donor_match::core::{BloodType, Donor, UrgencyLevel};
use donor_match::matching::{
    is_compatible, rank_matches, MatchRequest, MatchingConfig, MatchingEngine,
};

const LOCATIONS: [&str; 6] = ["Dhaka", "dhaka", "North Dhaka", "Sylhet", "Chittagong", ""];

fn blood_type() -> impl Strategy<Value = BloodType> {
    prop::sample::select(BloodType::ALL.to_vec())
}

fn urgency() -> impl Strategy<Value = UrgencyLevel> {
    prop::sample::select(UrgencyLevel::ALL.to_vec())
}

fn location() -> impl Strategy<Value = String> {
    prop::sample::select(LOCATIONS.to_vec()).prop_map(str::to_string)
}

fn donors() -> impl Strategy<Value = Vec<Donor>> {
    prop::collection::vec((blood_type(), location()), 0..24).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (bt, loc))| Donor::new(format!("DNR{:03}", i + 1), format!("Donor {i}"), bt, loc))
            .collect()
    })
}

fn request() -> impl Strategy<Value = MatchRequest> {
    (blood_type(), location(), urgency()).prop_map(|(bt, loc, u)| MatchRequest::new(bt, loc, u))
}

proptest! {
    #[test]
    fn every_candidate_is_compatible(req in request(), pool in donors()) {
        for m in rank_matches(&req, &pool) {
            prop_assert!(is_compatible(req.blood_type, m.donor.blood_type));
        }
    }

    #[test]
    fn every_compatible_donor_is_returned(req in request(), pool in donors()) {
        let expected = pool
            .iter()
            .filter(|d| is_compatible(req.blood_type, d.blood_type))
            .count();
        prop_assert_eq!(rank_matches(&req, &pool).len(), expected);
    }

    #[test]
    fn ranking_is_deterministic(req in request(), pool in donors()) {
        prop_assert_eq!(rank_matches(&req, &pool), rank_matches(&req, &pool));
    }

    #[test]
    fn ranks_are_contiguous_and_ordered(req in request(), pool in donors()) {
        let matches = rank_matches(&req, &pool);
        for (i, m) in matches.iter().enumerate() {
            prop_assert_eq!(m.rank, i + 1);
        }
        for pair in matches.windows(2) {
            let a = (pair[0].location_affinity.tier, pair[0].compatibility());
            let b = (pair[1].location_affinity.tier, pair[1].compatibility());
            prop_assert!(a >= b, "{:?} ranked before {:?}", a, b);
        }
    }

    #[test]
    fn cap_keeps_a_prefix(req in request(), pool in donors(), cap in 1usize..8) {
        let full = rank_matches(&req, &pool);
        let report = MatchingEngine::with_config(&pool, MatchingConfig::with_result_cap(cap))
            .find_matches(&req);

        prop_assert_eq!(report.compatible_count, full.len());
        prop_assert_eq!(report.truncated, full.len() > cap);
        prop_assert_eq!(&report.candidates[..], &full[..full.len().min(cap)]);
    }

    #[test]
    fn universal_recipient_accepts_everyone(pool in donors(), loc in location()) {
        let req = MatchRequest::new(BloodType::AbPos, loc, UrgencyLevel::Low);
        prop_assert_eq!(rank_matches(&req, &pool).len(), pool.len());
    }

    #[test]
    fn universal_donor_always_included(req in request(), pool in donors()) {
        let universal = pool.iter().filter(|d| d.blood_type == BloodType::ONeg).count();
        let included = rank_matches(&req, &pool)
            .iter()
            .filter(|m| m.donor.blood_type == BloodType::ONeg)
            .count();
        prop_assert_eq!(included, universal);
    }
}
