//! 매칭 엔진 불변식 속성 테스트.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use runner_core::{Order, Side, Tick, SIMULATED_EXCHANGE};
use runner_engine::{OrderEvent, SimulatedExchange};

fn tick(bid: u64, ask: u64) -> Tick {
    let mut tick = Tick::from_last(
        "005930",
        Decimal::from(bid),
        Decimal::from(100u64),
        SIMULATED_EXCHANGE,
        Utc::now(),
    );
    tick.bid = Decimal::from(bid);
    tick.ask = Decimal::from(ask);
    tick
}

proptest! {
    /// 지정가 매수는 지정가 이하로만 체결된다.
    #[test]
    fn limit_buy_fills_at_or_below_limit(
        limit in 1u64..100_000,
        bid in 1u64..100_000,
        spread in 0u64..500,
        quantity in 1u64..10_000,
    ) {
        let mut exchange = SimulatedExchange::new();
        let order = Order::limit(
            "005930",
            Side::Buy,
            Decimal::from(quantity),
            Decimal::from(limit),
            SIMULATED_EXCHANGE,
        );

        let mut events = exchange.submit_limit(order);
        events.extend(exchange.on_tick(&tick(bid, bid + spread)));

        for event in events {
            if let OrderEvent::Executed(execution) = event {
                prop_assert!(execution.fill.price <= Decimal::from(limit));
            }
        }
    }

    /// 지정가 매도는 지정가 이상으로만 체결된다.
    #[test]
    fn limit_sell_fills_at_or_above_limit(
        limit in 1u64..100_000,
        bid in 1u64..100_000,
        spread in 0u64..500,
        quantity in 1u64..10_000,
    ) {
        let mut exchange = SimulatedExchange::new();
        let order = Order::limit(
            "005930",
            Side::Sell,
            Decimal::from(quantity),
            Decimal::from(limit),
            SIMULATED_EXCHANGE,
        );

        let mut events = exchange.submit_limit(order);
        events.extend(exchange.on_tick(&tick(bid, bid + spread)));

        for event in events {
            if let OrderEvent::Executed(execution) = event {
                prop_assert!(execution.fill.price >= Decimal::from(limit));
            }
        }
    }

    /// 체결 수량은 주문 수량을 넘지 않으며 잔량과 합이 주문 수량이다.
    #[test]
    fn fill_quantity_never_exceeds_order(
        bid in 1u64..100_000,
        spread in 0u64..500,
        quantity in 1u64..10_000,
    ) {
        let mut exchange = SimulatedExchange::new();
        exchange.on_tick(&tick(bid, bid + spread));

        let order = Order::market(
            "005930",
            Side::Buy,
            Decimal::from(quantity),
            SIMULATED_EXCHANGE,
        );
        let order_quantity = order.quantity;

        for event in exchange.submit_market(order) {
            if let OrderEvent::Executed(execution) = event {
                prop_assert!(execution.fill.quantity <= order_quantity);
                prop_assert_eq!(
                    execution.fill.quantity + execution.fill.leaves_quantity,
                    order_quantity
                );
            }
        }
    }
}
