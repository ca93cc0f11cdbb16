use parley_web::App;

fn main() {
    dioxus::launch(App);
}
