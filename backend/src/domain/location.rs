//! Location context for local landing pages.
//!
//! A [`UserLocation`] is derived either from the `/atendimento/...` URL
//! segments or from the admin link generator, and drives the copy shown on
//! the page. Canonical paths are built from slugs of the state, city and
//! optional specialty.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::slug::{deslugify, slugify};

/// Root segment shared by every location page.
pub const LOCATION_ROOT: &str = "/atendimento";

/// Brazilian federative unit, or the nationwide sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StateCode {
    Ac,
    Al,
    Ap,
    Am,
    Ba,
    Ce,
    Df,
    Es,
    Go,
    Ma,
    Mt,
    Ms,
    Mg,
    Pa,
    Pb,
    Pr,
    Pe,
    Pi,
    Rj,
    Rn,
    Rs,
    Ro,
    Rr,
    Sc,
    Sp,
    Se,
    To,
    /// No specific state: the page targets the whole country.
    Brasil,
}

const STATES: [(StateCode, &str, &str); 28] = [
    (StateCode::Ac, "AC", "Acre"),
    (StateCode::Al, "AL", "Alagoas"),
    (StateCode::Ap, "AP", "Amapá"),
    (StateCode::Am, "AM", "Amazonas"),
    (StateCode::Ba, "BA", "Bahia"),
    (StateCode::Ce, "CE", "Ceará"),
    (StateCode::Df, "DF", "Distrito Federal"),
    (StateCode::Es, "ES", "Espírito Santo"),
    (StateCode::Go, "GO", "Goiás"),
    (StateCode::Ma, "MA", "Maranhão"),
    (StateCode::Mt, "MT", "Mato Grosso"),
    (StateCode::Ms, "MS", "Mato Grosso do Sul"),
    (StateCode::Mg, "MG", "Minas Gerais"),
    (StateCode::Pa, "PA", "Pará"),
    (StateCode::Pb, "PB", "Paraíba"),
    (StateCode::Pr, "PR", "Paraná"),
    (StateCode::Pe, "PE", "Pernambuco"),
    (StateCode::Pi, "PI", "Piauí"),
    (StateCode::Rj, "RJ", "Rio de Janeiro"),
    (StateCode::Rn, "RN", "Rio Grande do Norte"),
    (StateCode::Rs, "RS", "Rio Grande do Sul"),
    (StateCode::Ro, "RO", "Rondônia"),
    (StateCode::Rr, "RR", "Roraima"),
    (StateCode::Sc, "SC", "Santa Catarina"),
    (StateCode::Sp, "SP", "São Paulo"),
    (StateCode::Se, "SE", "Sergipe"),
    (StateCode::To, "TO", "Tocantins"),
    (StateCode::Brasil, "Brasil", "Brasil"),
];

impl StateCode {
    /// Every federative unit, excluding the nationwide sentinel.
    pub fn federative_units() -> impl Iterator<Item = StateCode> {
        STATES
            .iter()
            .map(|(code, _, _)| *code)
            .filter(|code| !code.is_nationwide())
    }

    /// Wire form: the two-letter UF code, or `Brasil`.
    pub fn as_str(self) -> &'static str {
        STATES
            .iter()
            .find(|(code, _, _)| *code == self)
            .map_or("Brasil", |(_, raw, _)| *raw)
    }

    /// Full state name in Portuguese.
    pub fn name(self) -> &'static str {
        STATES
            .iter()
            .find(|(code, _, _)| *code == self)
            .map_or("Brasil", |(_, _, name)| *name)
    }

    /// `true` for the `Brasil` sentinel.
    pub fn is_nationwide(self) -> bool {
        self == Self::Brasil
    }
}

/// Raised when a state code is not a UF code nor `Brasil`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown state code '{0}'")]
pub struct InvalidStateCode(pub String);

impl FromStr for StateCode {
    type Err = InvalidStateCode;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        STATES
            .iter()
            .find(|(_, code, _)| code.eq_ignore_ascii_case(trimmed))
            .map(|(code, _, _)| *code)
            .ok_or_else(|| InvalidStateCode(trimmed.to_owned()))
    }
}

impl TryFrom<String> for StateCode {
    type Error = InvalidStateCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StateCode> for String {
    fn from(value: StateCode) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A city the landing pages know by name and coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnownCity {
    pub state: StateCode,
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
    pub capital: bool,
}

const fn city(state: StateCode, name: &'static str, lat: f64, lng: f64, capital: bool) -> KnownCity {
    KnownCity {
        state,
        name,
        lat,
        lng,
        capital,
    }
}

/// State capitals plus the larger regional hubs used for local pages.
pub const KNOWN_CITIES: [KnownCity; 37] = [
    city(StateCode::Ac, "Rio Branco", -9.9747, -67.8243, true),
    city(StateCode::Al, "Maceió", -9.6658, -35.7350, true),
    city(StateCode::Ap, "Macapá", 0.0349, -51.0694, true),
    city(StateCode::Am, "Manaus", -3.1190, -60.0217, true),
    city(StateCode::Ba, "Salvador", -12.9777, -38.5016, true),
    city(StateCode::Ba, "Feira de Santana", -12.2664, -38.9663, false),
    city(StateCode::Ce, "Fortaleza", -3.7319, -38.5267, true),
    city(StateCode::Df, "Brasília", -15.7939, -47.8828, true),
    city(StateCode::Es, "Vitória", -20.3155, -40.3128, true),
    city(StateCode::Go, "Goiânia", -16.6869, -49.2648, true),
    city(StateCode::Ma, "São Luís", -2.5307, -44.3068, true),
    city(StateCode::Mt, "Cuiabá", -15.6014, -56.0979, true),
    city(StateCode::Ms, "Campo Grande", -20.4697, -54.6201, true),
    city(StateCode::Mg, "Belo Horizonte", -19.9167, -43.9345, true),
    city(StateCode::Mg, "Uberlândia", -18.9186, -48.2772, false),
    city(StateCode::Mg, "Juiz de Fora", -21.7642, -43.3496, false),
    city(StateCode::Pa, "Belém", -1.4558, -48.4902, true),
    city(StateCode::Pb, "João Pessoa", -7.1195, -34.8450, true),
    city(StateCode::Pr, "Curitiba", -25.4284, -49.2733, true),
    city(StateCode::Pr, "Londrina", -23.3045, -51.1696, false),
    city(StateCode::Pe, "Recife", -8.0476, -34.8770, true),
    city(StateCode::Pi, "Teresina", -5.0920, -42.8038, true),
    city(StateCode::Rj, "Rio de Janeiro", -22.9068, -43.1729, true),
    city(StateCode::Rj, "Niterói", -22.8832, -43.1034, false),
    city(StateCode::Rn, "Natal", -5.7945, -35.2110, true),
    city(StateCode::Rs, "Porto Alegre", -30.0346, -51.2177, true),
    city(StateCode::Ro, "Porto Velho", -8.7612, -63.9004, true),
    city(StateCode::Rr, "Boa Vista", 2.8235, -60.6758, true),
    city(StateCode::Sc, "Florianópolis", -27.5954, -48.5480, true),
    city(StateCode::Sc, "Joinville", -26.3045, -48.8487, false),
    city(StateCode::Sp, "São Paulo", -23.5505, -46.6333, true),
    city(StateCode::Sp, "Campinas", -22.9099, -47.0626, false),
    city(StateCode::Sp, "Santos", -23.9608, -46.3336, false),
    city(StateCode::Sp, "Ribeirão Preto", -21.1775, -47.8103, false),
    city(StateCode::Sp, "São José dos Campos", -23.2237, -45.9009, false),
    city(StateCode::Se, "Aracaju", -10.9472, -37.0731, true),
    city(StateCode::To, "Palmas", -10.2491, -48.3243, true),
];

/// Specialties advertised on local pages, in display form.
pub const SPECIALTIES: [&str; 12] = [
    "Clínica Médica",
    "Cardiologia",
    "Dermatologia",
    "Pediatria",
    "Psiquiatria",
    "Ginecologia",
    "Ortopedia",
    "Endocrinologia",
    "Neurologia",
    "Gastroenterologia",
    "Psicologia",
    "Nutrição",
];

fn known_city(state: StateCode, city_slug: &str) -> Option<&'static KnownCity> {
    KNOWN_CITIES
        .iter()
        .find(|known| known.state == state && slugify(known.name) == city_slug)
}

fn capital_of(state: StateCode) -> Option<&'static KnownCity> {
    KNOWN_CITIES
        .iter()
        .find(|known| known.state == state && known.capital)
}

/// Canonical display name for a specialty slug, when it is in the catalogue.
pub fn known_specialty(slug: &str) -> Option<&'static str> {
    SPECIALTIES
        .iter()
        .copied()
        .find(|name| slugify(name) == slug)
}

/// Reasons a location cannot be derived.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error(transparent)]
    InvalidState(#[from] InvalidStateCode),
    #[error("city must not be empty")]
    EmptyCity,
}

/// Location context shared by every content block on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLocation {
    pub city: String,
    pub state: StateCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl Default for UserLocation {
    fn default() -> Self {
        Self::nationwide()
    }
}

impl UserLocation {
    /// Context used when no location is selected.
    pub fn nationwide() -> Self {
        Self {
            city: StateCode::Brasil.name().to_owned(),
            state: StateCode::Brasil,
            specialty: None,
            lat: None,
            lng: None,
        }
    }

    /// Build a location from admin form values (display text).
    ///
    /// # Errors
    /// Returns [`LocationError`] for an unknown state or a blank city.
    pub fn from_selection(
        state: &str,
        city: &str,
        specialty: Option<&str>,
    ) -> Result<Self, LocationError> {
        let state: StateCode = state.parse()?;
        let city = city.trim();
        if city.is_empty() {
            return Err(LocationError::EmptyCity);
        }
        let known = known_city(state, &slugify(city));
        Ok(Self {
            city: city.to_owned(),
            state,
            specialty: specialty
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_owned),
            lat: known.map(|c| c.lat),
            lng: known.map(|c| c.lng),
        })
    }

    /// Recover a location from `/atendimento/{state}/{city}/{specialty}` segments.
    ///
    /// Accented names and coordinates are restored for known cities and
    /// catalogue specialties; other segments are turned back into labels on
    /// a best-effort basis. A missing city segment selects the state capital;
    /// `brasil` without a city is the nationwide context.
    ///
    /// # Errors
    /// Returns [`LocationError::InvalidState`] when the state segment is not
    /// a UF code or `brasil`, and [`LocationError::EmptyCity`] when the city
    /// segment has no slug characters.
    pub fn from_path_segments(
        state: &str,
        city: Option<&str>,
        specialty: Option<&str>,
    ) -> Result<Self, LocationError> {
        let state: StateCode = state.parse()?;
        let mut location = match city {
            None if state.is_nationwide() => Self::nationwide(),
            None => match capital_of(state) {
                Some(capital) => Self {
                    city: capital.name.to_owned(),
                    state,
                    specialty: None,
                    lat: Some(capital.lat),
                    lng: Some(capital.lng),
                },
                None => Self {
                    city: state.name().to_owned(),
                    state,
                    specialty: None,
                    lat: None,
                    lng: None,
                },
            },
            Some(raw) => {
                let city_slug = slugify(raw);
                if city_slug.is_empty() {
                    return Err(LocationError::EmptyCity);
                }
                match known_city(state, &city_slug) {
                    Some(known) => Self {
                        city: known.name.to_owned(),
                        state,
                        specialty: None,
                        lat: Some(known.lat),
                        lng: Some(known.lng),
                    },
                    None => Self {
                        city: deslugify(&city_slug),
                        state,
                        specialty: None,
                        lat: None,
                        lng: None,
                    },
                }
            }
        };
        location.specialty = specialty
            .map(slugify)
            .filter(|slug| !slug.is_empty())
            .map(|slug| known_specialty(&slug).map_or_else(|| deslugify(&slug), str::to_owned));
        Ok(location)
    }

    /// Canonical page path for this location.
    ///
    /// # Examples
    /// ```
    /// use telesaude::domain::location::UserLocation;
    ///
    /// let location = UserLocation::from_selection("SP", "Campinas", Some("Cardiologia"))
    ///     .expect("valid selection");
    /// assert_eq!(location.canonical_path(), "/atendimento/sp/campinas/cardiologia");
    /// ```
    pub fn canonical_path(&self) -> String {
        let mut path = format!(
            "{LOCATION_ROOT}/{}/{}",
            slugify(self.state.as_str()),
            slugify(&self.city)
        );
        if let Some(specialty) = self.specialty.as_deref().map(slugify) {
            if !specialty.is_empty() {
                path.push('/');
                path.push_str(&specialty);
            }
        }
        path
    }

    /// Headline and subheadline interpolated with this location.
    pub fn copy(&self) -> LocationCopy {
        let place = if self.state.is_nationwide() {
            "todo o Brasil".to_owned()
        } else {
            self.city.clone()
        };
        let headline = match &self.specialty {
            Some(specialty) => format!("{specialty} online em {place}"),
            None => format!("Médicos online em {place}"),
        };
        let subheadline = if self.state.is_nationwide() {
            "Atendimento por telemedicina em todo o Brasil, 24 horas por dia.".to_owned()
        } else {
            format!(
                "Atendimento por telemedicina para pacientes de {} - {}, 24 horas por dia.",
                self.city, self.state
            )
        };
        LocationCopy {
            headline,
            subheadline,
        }
    }
}

/// Interpolated page copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationCopy {
    pub headline: String,
    pub subheadline: String,
}

/// Outcome of syncing the address bar with an admin selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathUpdate {
    pub path: String,
    /// `true` when the generated path differs from the current one and the
    /// client should push a new history entry.
    pub changed: bool,
}

fn normalise_path(path: &str) -> &str {
    let trimmed = path.trim();
    match trimmed.trim_end_matches('/') {
        "" => "/",
        value => value,
    }
}

/// Compare the generated path for `location` with `current`.
///
/// Trailing slashes on the current path are ignored.
pub fn sync_path(current: Option<&str>, location: &UserLocation) -> PathUpdate {
    let path = location.canonical_path();
    let changed = current.map_or(true, |current| normalise_path(current) != path);
    PathUpdate { path, changed }
}

/// Local-SEO path set for every known city × catalogue specialty.
///
/// Each city contributes its bare page and one page per specialty. The
/// result is sorted and free of duplicates.
pub fn permutations(state: Option<StateCode>) -> Vec<String> {
    let mut paths = BTreeSet::new();
    let cities = KNOWN_CITIES
        .iter()
        .filter(|known| state.is_none_or(|state| state.is_nationwide() || known.state == state));
    for known in cities {
        let mut location = UserLocation {
            city: known.name.to_owned(),
            state: known.state,
            specialty: None,
            lat: Some(known.lat),
            lng: Some(known.lng),
        };
        paths.insert(location.canonical_path());
        for specialty in SPECIALTIES {
            location.specialty = Some(specialty.to_owned());
            paths.insert(location.canonical_path());
        }
    }
    paths.into_iter().collect()
}
