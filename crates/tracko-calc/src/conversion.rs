//! 單位換算與訂單衍生欄位

use rust_decimal::{Decimal, RoundingStrategy};
use tracko_core::Order;

/// 1 公斤 = 2.20462 磅
pub const KG_TO_LB: Decimal = Decimal::from_parts(220462, 0, 0, false, 5);

/// 公斤轉磅（四捨五入至整數）
pub fn kg_to_lb(kg: Decimal) -> Decimal {
    (kg * KG_TO_LB).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// 磅轉公斤（四捨五入至整數）
pub fn lb_to_kg(lb: Decimal) -> Decimal {
    (lb / KG_TO_LB).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// 單價：FOB 非 0 時取 FOB，否則取 CNF，都沒有則為 0
pub fn resolve_unit_price(fob: Option<Decimal>, cnf: Option<Decimal>) -> Decimal {
    [fob, cnf]
        .into_iter()
        .flatten()
        .find(|price| !price.is_zero())
        .unwrap_or(Decimal::ZERO)
}

/// 訂單衍生欄位維護
///
/// 修改數量或單價後，保持 `total_kg`、`total_lb` 與 `total_price` 一致。
pub struct OrderDerivation;

impl OrderDerivation {
    /// 以公斤為準更新數量
    pub fn apply_kg(order: &mut Order, kg: Decimal) {
        order.total_kg = kg;
        order.total_lb = kg_to_lb(kg);
        Self::refresh_total_price(order);
    }

    /// 以磅為準更新數量
    pub fn apply_lb(order: &mut Order, lb: Decimal) {
        order.total_lb = lb;
        order.total_kg = lb_to_kg(lb);
        Self::refresh_total_price(order);
    }

    /// 更新單價
    pub fn apply_unit_price(order: &mut Order, unit_price: Decimal) {
        order.unit_price = unit_price;
        Self::refresh_total_price(order);
    }

    /// 總金額 = 單價 × 總磅數
    pub fn refresh_total_price(order: &mut Order) {
        order.total_price = order.unit_price * order.total_lb;
    }

    /// 只有一種數量時補上另一種
    pub fn fill_missing_quantities(order: &mut Order) {
        if order.total_kg.is_zero() && !order.total_lb.is_zero() {
            order.total_kg = lb_to_kg(order.total_lb);
        }
        if order.total_lb.is_zero() && !order.total_kg.is_zero() {
            order.total_lb = kg_to_lb(order.total_kg);
        }
    }

    /// 匯入資料的完整推導：單價取自 FOB/CNF、補齊數量、計算總金額
    pub fn derive_imported(order: &mut Order) {
        order.unit_price = resolve_unit_price(order.fob_price, order.cnf_price);
        Self::fill_missing_quantities(order);
        Self::refresh_total_price(order);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tracko_core::Grade;

    fn order() -> Order {
        Order::new("CONT-1".to_string(), "Supplier".to_string(), Grade::WW320)
    }

    #[rstest]
    #[case(24948, 55001)]
    #[case(16000, 35274)]
    #[case(0, 0)]
    fn test_kg_to_lb(#[case] kg: i64, #[case] lb: i64) {
        assert_eq!(kg_to_lb(Decimal::from(kg)), Decimal::from(lb));
    }

    #[test]
    fn test_lb_to_kg() {
        assert_eq!(lb_to_kg(Decimal::from(55000)), Decimal::from(24948));
    }

    #[rstest]
    #[case(Some(Decimal::new(385, 2)), Some(Decimal::new(410, 2)), Decimal::new(385, 2))]
    #[case(Some(Decimal::ZERO), Some(Decimal::new(410, 2)), Decimal::new(410, 2))]
    #[case(None, Some(Decimal::new(410, 2)), Decimal::new(410, 2))]
    #[case(None, None, Decimal::ZERO)]
    fn test_resolve_unit_price(
        #[case] fob: Option<Decimal>,
        #[case] cnf: Option<Decimal>,
        #[case] expected: Decimal,
    ) {
        assert_eq!(resolve_unit_price(fob, cnf), expected);
    }

    #[test]
    fn test_apply_kg_recomputes_price() {
        let mut order = order();
        OrderDerivation::apply_unit_price(&mut order, Decimal::new(350, 2));
        OrderDerivation::apply_kg(&mut order, Decimal::from(16000));

        assert_eq!(order.total_lb, Decimal::from(35274));
        assert_eq!(order.total_price, Decimal::new(350, 2) * Decimal::from(35274));
    }

    #[test]
    fn test_apply_lb_recomputes_kg() {
        let mut order = order();
        OrderDerivation::apply_lb(&mut order, Decimal::from(55000));

        assert_eq!(order.total_kg, Decimal::from(24948));
        assert_eq!(order.total_price, Decimal::ZERO);
    }

    #[test]
    fn test_derive_imported() {
        let mut order = order();
        order.cnf_price = Some(Decimal::new(4, 0));
        order.total_lb = Decimal::from(1000);

        OrderDerivation::derive_imported(&mut order);

        assert_eq!(order.unit_price, Decimal::from(4));
        assert_eq!(order.total_kg, Decimal::from(454));
        assert_eq!(order.total_price, Decimal::from(4000));
    }
}
