//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and ports and remain testable without I/O.

use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;
use url::Url;

use crate::domain::AdminCredentials;
use crate::domain::checkout::CheckoutService;
use crate::domain::onboarding::OnboardingService;
use crate::domain::ports::{CheckoutGateway, CrmLookup, GenerativeModel};
use crate::domain::status::StatusBoard;
use crate::domain::triage::TriageService;

/// Parameter object bundling the driven ports the handlers depend on.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub crm: Arc<dyn CrmLookup>,
    pub model: Arc<dyn GenerativeModel>,
    pub checkout: Arc<dyn CheckoutGateway>,
    pub clock: Arc<dyn Clock>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub triage: TriageService,
    pub checkout: CheckoutService,
    pub onboarding: OnboardingService,
    pub status_board: Arc<StatusBoard>,
    pub clock: Arc<dyn Clock>,
    /// `None` disables the admin login.
    pub admin: Option<AdminCredentials>,
    pub trial_duration: Duration,
    pub public_base_url: Url,
}

impl HttpState {
    /// Assemble services from ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// use mockable::DefaultClock;
    /// use telesaude::domain::ports::{SimulatedCrmLookup, UnconfiguredModel};
    /// use telesaude::domain::status::StatusBoard;
    /// use telesaude::inbound::http::state::{HttpState, HttpStatePorts};
    /// use telesaude::outbound::checkout::SimulatedCheckoutGateway;
    /// use url::Url;
    ///
    /// let base = Url::parse("https://www.telesaude.example").expect("valid url");
    /// let ports = HttpStatePorts {
    ///     crm: Arc::new(SimulatedCrmLookup),
    ///     model: Arc::new(UnconfiguredModel),
    ///     checkout: Arc::new(SimulatedCheckoutGateway::new(base.clone())),
    ///     clock: Arc::new(DefaultClock),
    /// };
    /// let state = HttpState::new(ports, Arc::new(StatusBoard::new()), base)
    ///     .with_trial_duration(Duration::from_secs(60));
    /// assert!(state.admin.is_none());
    /// ```
    pub fn new(ports: HttpStatePorts, status_board: Arc<StatusBoard>, public_base_url: Url) -> Self {
        let HttpStatePorts {
            crm,
            model,
            checkout,
            clock,
        } = ports;
        Self {
            triage: TriageService::new(model),
            checkout: CheckoutService::new(checkout),
            onboarding: OnboardingService::new(crm, clock.clone()),
            status_board,
            clock,
            admin: None,
            trial_duration: crate::domain::trial::DEFAULT_TRIAL_DURATION,
            public_base_url,
        }
    }

    #[must_use]
    pub fn with_admin(mut self, admin: Option<AdminCredentials>) -> Self {
        self.admin = admin;
        self
    }

    #[must_use]
    pub fn with_trial_duration(mut self, duration: Duration) -> Self {
        self.trial_duration = duration;
        self
    }
}
