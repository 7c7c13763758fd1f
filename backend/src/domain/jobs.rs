//! Static careers board.

use serde::Serialize;
use utoipa::ToSchema;

/// Contract type of an opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    FullTime,
    PartTime,
    Contractor,
}

/// A published opening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobOpportunity {
    pub id: &'static str,
    pub slug: &'static str,
    pub title: &'static str,
    pub location: &'static str,
    pub kind: JobKind,
    pub description: &'static str,
}

/// Openings shown on `/carreiras`.
pub const JOB_OPPORTUNITIES: &[JobOpportunity] = &[
    JobOpportunity {
        id: "job-001",
        slug: "medico-clinico-geral-telemedicina",
        title: "Médico(a) Clínico(a) Geral - Telemedicina",
        location: "Remoto",
        kind: JobKind::Contractor,
        description: "Atendimentos online de clínica médica em plantões flexíveis, com CRM ativo.",
    },
    JobOpportunity {
        id: "job-002",
        slug: "psicologo-clinico",
        title: "Psicólogo(a) Clínico(a)",
        location: "Remoto",
        kind: JobKind::PartTime,
        description: "Sessões de psicoterapia online para adultos e adolescentes.",
    },
    JobOpportunity {
        id: "job-003",
        slug: "enfermeiro-triagem",
        title: "Enfermeiro(a) de Triagem",
        location: "São Paulo - SP",
        kind: JobKind::FullTime,
        description: "Acolhimento e classificação de risco de pacientes na central de atendimento.",
    },
    JobOpportunity {
        id: "job-004",
        slug: "engenheiro-de-software-backend",
        title: "Engenheiro(a) de Software Backend",
        location: "Remoto",
        kind: JobKind::FullTime,
        description: "Evolução da plataforma de teleatendimento e das integrações com parceiros.",
    },
];

/// Find an opening by slug.
pub fn find_job(slug: &str) -> Option<&'static JobOpportunity> {
    JOB_OPPORTUNITIES.iter().find(|job| job.slug == slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::slug::is_valid_slug;

    #[test]
    fn slugs_are_valid_and_unique() {
        for job in JOB_OPPORTUNITIES {
            assert!(is_valid_slug(job.slug), "{} is not a slug", job.slug);
            assert_eq!(
                JOB_OPPORTUNITIES.iter().filter(|other| other.slug == job.slug).count(),
                1
            );
        }
    }

    #[test]
    fn finds_jobs_by_slug() {
        assert_eq!(find_job("psicologo-clinico").map(|job| job.id), Some("job-002"));
        assert!(find_job("nao-existe").is_none());
    }
}
