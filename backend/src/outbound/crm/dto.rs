//! DTOs for decoding CRM registry responses.

use serde::Deserialize;

use crate::domain::crm::CrmRecord;

#[derive(Debug, Deserialize)]
pub(super) struct CrmRecordDto {
    pub(super) nome: String,
    pub(super) situacao: String,
    #[serde(default)]
    pub(super) especialidades: Vec<String>,
}

impl CrmRecordDto {
    pub(super) fn into_domain(self) -> Result<CrmRecord, String> {
        let name = self.nome.trim();
        if name.is_empty() {
            return Err("registry record has an empty name".to_owned());
        }
        Ok(CrmRecord {
            name: name.to_owned(),
            status: self.situacao.trim().to_owned(),
            specialties: self
                .especialidades
                .into_iter()
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
                .collect(),
        })
    }
}
