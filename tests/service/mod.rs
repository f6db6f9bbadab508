mod players;
mod transactions;
mod waivers;
