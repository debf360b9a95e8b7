//! Checkout service.
//!
//! Placing an order books each cart line on its own: remotely when signed
//! in, otherwise (or when the backend refuses) on this device. Lines that
//! end up booked leave the cart; lines that could not be booked anywhere
//! stay for a retry.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use homefix::{
    addresses::Address,
    bookings::{Booking, NewBooking},
    cart::CartLine,
    pricing::PriceBreakdown,
    profiles::{UserId, UserProfile},
    schedule::is_known_slot,
    validation::FieldErrors,
};
use jiff::civil::Date;
use mockall::automock;
use tracing::{info, warn};

use crate::{
    domain::{
        bookings::BookingStore,
        cart::CartStore,
        checkout::{
            errors::CheckoutError,
            models::{BookingOutcome, CheckoutReport, CheckoutRequest, LineOutcome},
        },
    },
    gateway::{
        Collection, GatewayError, RemoteGateway, decode_first,
        records::{BookingInsert, BookingRow},
    },
    storage::{LocalStorage, keys},
};

/// Clears the in-flight flag when the checkout ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct Order {
    user: UserId,
    date: Date,
    time: String,
    address: Address,
}

fn validate(
    request: &CheckoutRequest,
    lines: &[CartLine],
    user: Option<UserId>,
) -> Result<Order, FieldErrors> {
    let mut errors = FieldErrors::new();

    if lines.is_empty() {
        errors.insert("cart", "Your cart is empty");
    }

    if user.is_none() {
        errors.insert("user", "Please sign in to place an order");
    }

    if request.date.is_none() {
        errors.insert("date", "Please select a date");
    }

    match request.time.as_deref() {
        None => errors.insert("time", "Please select a time slot"),
        Some(slot) if !is_known_slot(slot) => {
            errors.insert("time", "Please select one of the offered time slots");
        }
        Some(_) => {}
    }

    if request.address.is_none() {
        errors.insert("address", "Please select an address");
    }

    match (user, request.date, &request.time, &request.address) {
        (Some(user), Some(date), Some(time), Some(address)) if errors.is_empty() => Ok(Order {
            user,
            date,
            time: time.clone(),
            address: address.clone(),
        }),
        _ => Err(errors),
    }
}

/// Books cart lines one by one, falling back to this device per line.
pub struct SagaCheckoutService {
    cart: Arc<CartStore>,
    bookings: Arc<BookingStore>,
    gateway: Arc<dyn RemoteGateway>,
    storage: Arc<LocalStorage>,
    in_flight: AtomicBool,
}

impl SagaCheckoutService {
    #[must_use]
    pub fn new(
        cart: Arc<CartStore>,
        bookings: Arc<BookingStore>,
        gateway: Arc<dyn RemoteGateway>,
        storage: Arc<LocalStorage>,
    ) -> Self {
        Self {
            cart,
            bookings,
            gateway,
            storage,
            in_flight: AtomicBool::new(false),
        }
    }

    async fn book(&self, booking: NewBooking, signed_in: bool) -> BookingOutcome {
        let reason = if signed_in {
            match self.insert_remote(&booking).await {
                Ok(stored) => return BookingOutcome::Remote(self.bookings.add(stored)),
                Err(error) => {
                    if error.falls_back_locally() {
                        warn!(
                            service = %booking.service_id,
                            %error,
                            "remote booking failed, saving on this device"
                        );
                    } else {
                        warn!(
                            service = %booking.service_id,
                            %error,
                            "access policy rejected booking, saving on this device"
                        );
                    }
                    error
                }
            }
        } else {
            GatewayError::NotAuthenticated
        };

        match self.bookings.try_add(booking) {
            Ok(booking) => BookingOutcome::Local { booking, reason },
            Err(error) => BookingOutcome::Failed { reason, error },
        }
    }

    async fn insert_remote(&self, booking: &NewBooking) -> Result<Booking, GatewayError> {
        let body = serde_json::to_value(BookingInsert::from(booking))
            .map_err(|error| GatewayError::Unknown(error.to_string()))?;

        let rows = self.gateway.insert(Collection::Bookings, body).await?;

        decode_first::<BookingRow>(Collection::Bookings, rows)
            .map(|row| row.into_booking(Some(booking)))
            .ok_or_else(|| GatewayError::Unknown("no booking row returned".to_string()))
    }
}

#[async_trait]
impl CheckoutService for SagaCheckoutService {
    fn quote(&self, tip: u64) -> PriceBreakdown {
        PriceBreakdown::new(self.cart.total_price(), tip)
    }

    async fn place_order(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutReport, CheckoutError> {
        let _guard =
            InFlight::acquire(&self.in_flight).ok_or(CheckoutError::AlreadyInProgress)?;

        let lines = self.cart.items();
        let session = self.gateway.session();

        let user = session.as_ref().map(|session| session.user_id.clone()).or_else(|| {
            self.storage
                .read_durable::<UserProfile>(keys::USER)
                .map(|profile| profile.id)
        });

        let order = validate(&request, &lines, user)?;

        let breakdown = PriceBreakdown::new(
            lines.iter().map(CartLine::line_total).sum(),
            request.tip,
        );

        info!(
            lines = lines.len(),
            total = breakdown.total(),
            signed_in = session.is_some(),
            "placing order"
        );

        let mut outcomes = Vec::with_capacity(lines.len());

        for (index, line) in lines.iter().enumerate() {
            let mut booking = NewBooking::for_line(
                line,
                order.user.clone(),
                &order.address,
                order.date,
                order.time.clone(),
            );

            booking.payment_method = Some(request.payment_method.clone());

            if index == 0 && request.tip > 0 {
                booking.tip_amount = Some(request.tip);
            }

            let result = self.book(booking, session.is_some()).await;

            if result.is_booked() {
                self.cart.remove_line(&line.service.id);
            }

            outcomes.push(LineOutcome {
                service_id: line.service.id.clone(),
                quantity: line.quantity,
                result,
            });
        }

        let report = CheckoutReport {
            outcomes,
            breakdown,
        };

        if report.is_complete_success() {
            info!(bookings = report.bookings().count(), "order placed");
        } else {
            warn!(
                booked = report.bookings().count(),
                failed = report.failed().count(),
                "order only partly placed"
            );
        }

        Ok(report)
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Price the current cart with `tip`.
    fn quote(&self, tip: u64) -> PriceBreakdown;

    /// Validate the request, then book every cart line.
    ///
    /// Validation failures are reported before any remote call. Once
    /// validation passes the call always returns a report, even if no line
    /// could be booked.
    async fn place_order(&self, request: CheckoutRequest)
    -> Result<CheckoutReport, CheckoutError>;
}
