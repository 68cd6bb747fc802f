//! # Repository Module
//!
//! One repository per table, each holding a clone of the pool.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                          │
//! │       │  db.orders().checkout("asha", &cart)                           │
//! │       ▼                                                                 │
//! │  OrderRepository ──► one transaction over orders + drugs               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`customer::CustomerRepository`] - Registered customers
//! - [`drug::DrugRepository`] - Drug inventory
//! - [`order::OrderRepository`] - Order history and checkout

pub mod customer;
pub mod drug;
pub mod order;
