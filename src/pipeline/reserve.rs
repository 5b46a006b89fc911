use uuid::Uuid;

use super::provisional::{delete_provisional, get_provisional};
use crate::clock::Clock;
use crate::error::{Result, RoutingError};
use crate::model::reserved::{OtcReservationMeta, ReservedQuote, RESERVED_TTL_MS};
use crate::store::KeyValueStore;

fn reserved_key(quote_id: &str) -> String {
    format!("quote:reserved:{quote_id}")
}

/// Promotes a live provisional quote into a reservation. Ordering matches
/// §5: the reserved key is written (via a `SETNX`-style conditional write)
/// before the provisional key is deleted, so a racing second `reserve` call
/// for the same `quoteId` fails rather than double-reserving.
pub async fn reserve(
    store: &dyn KeyValueStore,
    clock: &dyn Clock,
    quote_id: &str,
    client_id: &str,
    otc_reservation_meta: Option<OtcReservationMeta>,
) -> Result<ReservedQuote> {
    let provisional = get_provisional(store, clock, quote_id).await?;

    let reservation_id = Uuid::new_v4().to_string();
    let reserved_until_ts = clock.now_ms() + RESERVED_TTL_MS;
    let reserved = ReservedQuote::from_provisional(
        provisional,
        reservation_id,
        client_id.to_string(),
        reserved_until_ts,
        otc_reservation_meta,
    );

    let key = reserved_key(quote_id);
    let json = serde_json::to_string(&reserved).expect("ReservedQuote always serializes");
    let written = store.set_nx(&key, &json, Some(RESERVED_TTL_MS)).await;
    if !written {
        return Err(RoutingError::not_found(format!(
            "quote {quote_id} is already reserved"
        )));
    }

    delete_provisional(store, quote_id).await;
    Ok(reserved)
}

/// Reads a reservation by `quoteId`. An expired record is absent.
pub async fn get_reserved(
    store: &dyn KeyValueStore,
    clock: &dyn Clock,
    quote_id: &str,
) -> Result<ReservedQuote> {
    let key = reserved_key(quote_id);
    let raw = store
        .get(&key)
        .await
        .ok_or_else(|| RoutingError::not_found(format!("no reservation for quote {quote_id}")))?;
    let reserved: ReservedQuote = serde_json::from_str(&raw)
        .map_err(|e| RoutingError::Internal(format!("corrupt reservation record {quote_id}: {e}")))?;
    if !reserved.is_live(clock.now_ms()) {
        return Err(RoutingError::Expired(format!("reservation for quote {quote_id} expired")));
    }
    Ok(reserved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::model::provisional::{QuoteType, ScoringMeta};
    use crate::pipeline::provisional::store_provisional;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn scoring_meta() -> ScoringMeta {
        ScoringMeta { settlement_days: 0.1, counterparty_risk: 0.001, time_penalty: 1.0, confidence: 0.9 }
    }

    #[tokio::test]
    async fn reserve_deletes_provisional_and_a_second_reserve_fails() {
        let clock = Arc::new(FixedClock::new(0));
        let store = MemoryStore::new(clock.clone());
        let quote = store_provisional(&store, clock.as_ref(), None, None, 1000.0, 920.0, 900.0, Some(30), scoring_meta(), QuoteType::Otc).await;

        let reserved = reserve(&store, clock.as_ref(), &quote.quote_id, "c1", None).await.unwrap();
        assert_eq!(reserved.reserved_by_client, "c1");

        use super::super::provisional::get_provisional;
        let err = get_provisional(&store, clock.as_ref(), &quote.quote_id).await.unwrap_err();
        assert!(matches!(err, RoutingError::NotFound(_)));

        let second = reserve(&store, clock.as_ref(), &quote.quote_id, "c2", None).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn reserve_fails_not_found_for_unknown_quote() {
        let clock = Arc::new(FixedClock::new(0));
        let store = MemoryStore::new(clock.clone());
        let err = reserve(&store, clock.as_ref(), "nope", "c1", None).await.unwrap_err();
        assert!(matches!(err, RoutingError::NotFound(_)));
    }
}
