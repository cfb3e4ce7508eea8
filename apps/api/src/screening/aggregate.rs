use crate::screening::assess::CandidateAssessment;

/// Orders assessments by score, highest first. Absent scores rank as 0.
/// The sort is stable: equal scores keep upload order.
pub fn rank_assessments(mut assessments: Vec<CandidateAssessment>) -> Vec<CandidateAssessment> {
    assessments.sort_by(|a, b| b.rank_score().cmp(&a.rank_score()));
    assessments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assessment(name: &str, score: Option<u32>) -> CandidateAssessment {
        CandidateAssessment {
            name: name.to_string(),
            score,
            summary: String::new(),
        }
    }

    fn names(ranked: &[CandidateAssessment]) -> Vec<&str> {
        ranked.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn test_sorted_descending() {
        let ranked = rank_assessments(vec![
            assessment("low", Some(12)),
            assessment("high", Some(91)),
            assessment("mid", Some(55)),
        ]);
        assert_eq!(names(&ranked), vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_absent_score_sorts_as_zero() {
        let ranked = rank_assessments(vec![
            assessment("none", None),
            assessment("one", Some(1)),
        ]);
        assert_eq!(names(&ranked), vec!["one", "none"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ranked = rank_assessments(vec![
            assessment("first", Some(70)),
            assessment("top", Some(90)),
            assessment("second", Some(70)),
        ]);
        assert_eq!(names(&ranked), vec!["top", "first", "second"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(rank_assessments(Vec::new()).is_empty());
    }
}
