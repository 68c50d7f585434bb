use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{
    common::{CandidateId, ListId},
    db::{Candidate, CandidateList},
};

/// A new candidate list, as submitted on the admin route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CandidateListSpec {
    pub name: String,
}

/// A new candidate list, as submitted on the voter route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewListRequest {
    pub list_name: String,
}

impl From<NewListRequest> for CandidateListSpec {
    fn from(request: NewListRequest) -> Self {
        Self {
            name: request.list_name,
        }
    }
}

/// A new candidate on an existing list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CandidateSpec {
    pub name: String,
    pub party: String,
    pub list_id: ListId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDescription {
    pub id: CandidateId,
    pub name: String,
    pub party: String,
    pub votes: u32,
    pub list_id: ListId,
}

impl From<Candidate> for CandidateDescription {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.id,
            name: candidate.name,
            party: candidate.party,
            votes: candidate.votes,
            list_id: candidate.list_id,
        }
    }
}

/// A list together with all of its candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateListDescription {
    pub id: ListId,
    pub name: String,
    pub list_votes: u32,
    pub candidates: Vec<CandidateDescription>,
}

impl CandidateListDescription {
    /// Attach each candidate to its list, keeping the order in which both were given.
    /// Candidates whose list is not among `lists` are dropped.
    pub fn group(lists: Vec<CandidateList>, candidates: Vec<Candidate>) -> Vec<Self> {
        let mut by_list: HashMap<ListId, Vec<CandidateDescription>> = HashMap::new();
        for candidate in candidates {
            by_list
                .entry(candidate.list_id)
                .or_default()
                .push(candidate.into());
        }

        lists
            .into_iter()
            .map(|list| Self {
                candidates: by_list.remove(&list.id).unwrap_or_default(),
                id: list.id,
                name: list.name,
                list_votes: list.list_votes,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_candidates_by_list() {
        let lists = vec![CandidateList::example(), CandidateList::example2()];
        let candidates = vec![
            Candidate::example(1, "Rana", 2, 2),
            Candidate::example(2, "Karim", 1, 1),
            Candidate::example(3, "Maya", 0, 2),
            Candidate::example(4, "Orphan", 5, 99),
        ];

        let grouped = CandidateListDescription::group(lists, candidates);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].name, CandidateList::example().name);
        let names = |list: &CandidateListDescription| {
            list.candidates
                .iter()
                .map(|c| c.name.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&grouped[0]), vec!["Karim"]);
        assert_eq!(names(&grouped[1]), vec!["Rana", "Maya"]);
    }

    #[test]
    fn list_without_candidates() {
        let grouped = CandidateListDescription::group(vec![CandidateList::example()], Vec::new());
        assert_eq!(grouped.len(), 1);
        assert!(grouped[0].candidates.is_empty());
    }
}
