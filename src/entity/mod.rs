pub mod audit_logs;
pub mod cart_items;
pub mod checkout_submissions;
pub mod combined_orders;
pub mod coupon_usages;
pub mod coupons;
pub mod order_details;
pub mod products;
pub mod seller_orders;

pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use checkout_submissions::Entity as CheckoutSubmissions;
pub use combined_orders::Entity as CombinedOrders;
pub use coupon_usages::Entity as CouponUsages;
pub use coupons::Entity as Coupons;
pub use order_details::Entity as OrderDetails;
pub use products::Entity as Products;
pub use seller_orders::Entity as SellerOrders;
