use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::spec::submission::FormSubmission;
use crate::spec::template::FormTemplate;

/// Dashboard counters over a set of templates and their submissions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormStats {
    pub total_forms: usize,
    pub active_forms: usize,
    pub total_submissions: usize,
    pub submissions_by_form: BTreeMap<String, usize>,
}

impl FormStats {
    pub fn collect(templates: &[FormTemplate], submissions: &[FormSubmission]) -> Self {
        let mut submissions_by_form: BTreeMap<String, usize> = templates
            .iter()
            .map(|template| (template.effective_slug(), 0))
            .collect();
        for submission in submissions {
            *submissions_by_form
                .entry(submission.form_template().to_string())
                .or_default() += 1;
        }

        Self {
            total_forms: templates.len(),
            active_forms: templates.iter().filter(|template| template.is_active).count(),
            total_submissions: submissions.len(),
            submissions_by_form,
        }
    }
}
